//! # ZSL 匹配生成器
//!
//! Zur–McGill 二维晶格匹配：在面积上限内枚举薄膜与衬底的超晶格，
//! 找出长度和夹角都在容差内一致的超晶格对。
//!
//! ## 算法概述
//! 1. 面积倍数对 (i, j)：i·A_film ≤ max_area, j·A_sub ≤ max_area，
//!    且 |A_film / A_sub − j / i| < max_area_ratio_tol
//! 2. 对每个倍数 n 用 Hermite 正规形 [[a, b], [0, n/a]] 枚举全部 n 倍超晶格
//! 3. 超晶格基矢做 Zur–McGill 约化后逐对比较长度与夹角
//! 4. 按衬底倍数 j 分层（同层面积相同），层内去重并按应变排序，逐层惰性产出
//!
//! ## 依赖关系
//! - 被 `analyzer.rs`, `interface/builder.rs` 调用
//! - 使用 `zsl/lattice2d.rs`, `zsl/matching.rs`

use crate::error::{InterfaceError, Result};
use crate::math::EPS;
use crate::zsl::lattice2d::{reduce_tracked, rel_angle, rel_strain, Lattice2D, TrackedVector};
use crate::zsl::matching::ZslMatch;

use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// ZSL 参数
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZslConfig {
    /// 匹配面积上限（Å²）
    pub max_area: f64,
    /// 超晶格基矢长度的相对容差
    pub max_length_tol: f64,
    /// 超晶格夹角的相对容差
    pub max_angle_tol: f64,
    /// 面积比 A_film / A_sub 与 j / i 之差的容差
    pub max_area_ratio_tol: f64,
}

impl Default for ZslConfig {
    fn default() -> Self {
        ZslConfig {
            max_area: 400.0,
            max_length_tol: 0.03,
            max_angle_tol: 0.01,
            max_area_ratio_tol: 0.09,
        }
    }
}

impl ZslConfig {
    /// 只修改面积上限
    pub fn with_max_area(mut self, max_area: f64) -> Self {
        self.max_area = max_area;
        self
    }

    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("max_area", self.max_area),
            ("max_length_tol", self.max_length_tol),
            ("max_angle_tol", self.max_angle_tol),
            ("max_area_ratio_tol", self.max_area_ratio_tol),
        ];
        for (name, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(InterfaceError::InvalidArgument(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// ZSL 匹配生成器
#[derive(Debug, Clone)]
pub struct ZslGenerator {
    config: ZslConfig,
}

impl ZslGenerator {
    pub fn new(config: ZslConfig) -> Result<Self> {
        config.validate()?;
        Ok(ZslGenerator { config })
    }

    pub fn config(&self) -> &ZslConfig {
        &self.config
    }

    /// 惰性枚举匹配：面积升序，同面积内应变升序
    pub fn find_matches(&self, film: &Lattice2D, substrate: &Lattice2D) -> ZslMatches {
        let levels = self.area_levels(film.area(), substrate.area());
        log::debug!(
            "ZSL: film area {:.3} Å², substrate area {:.3} Å², {} area level(s) to search",
            film.area(),
            substrate.area(),
            levels.len()
        );
        ZslMatches {
            film: *film,
            substrate: *substrate,
            config: self.config.clone(),
            levels: levels.into(),
            buffer: VecDeque::new(),
        }
    }

    /// 两组超晶格基矢的长度与夹角是否在容差内一致
    pub fn is_same_vectors(&self, film: &Lattice2D, substrate: &Lattice2D) -> bool {
        is_same_vectors(&self.config, film, substrate)
    }

    /// 满足面积比条件的 (j, [i...])，按 j 升序
    fn area_levels(&self, film_area: f64, substrate_area: f64) -> Vec<(i32, Vec<i32>)> {
        if film_area < EPS || substrate_area < EPS {
            log::warn!("ZSL: degenerate in-plane lattice, no matches searched");
            return Vec::new();
        }
        let max_i = multiples_below(self.config.max_area, film_area);
        let max_j = multiples_below(self.config.max_area, substrate_area);
        let ratio = film_area / substrate_area;

        (1..=max_j)
            .filter_map(|j| {
                let film_multiples: Vec<i32> = (1..=max_i)
                    .filter(|&i| (ratio - j as f64 / i as f64).abs() < self.config.max_area_ratio_tol)
                    .collect();
                if film_multiples.is_empty() {
                    None
                } else {
                    Some((j, film_multiples))
                }
            })
            .collect()
    }
}

fn multiples_below(max_area: f64, area: f64) -> i32 {
    ((max_area / area) + 1e-9).floor().min(i32::MAX as f64) as i32
}

fn is_same_vectors(config: &ZslConfig, film: &Lattice2D, substrate: &Lattice2D) -> bool {
    if rel_strain(&film.a, &substrate.a).abs() > config.max_length_tol {
        return false;
    }
    if rel_strain(&film.b, &substrate.b).abs() > config.max_length_tol {
        return false;
    }
    rel_angle(film, substrate).abs() <= config.max_angle_tol
}

/// 匹配的惰性序列
///
/// 每次取下一个元素时最多计算一个面积层。
#[derive(Debug, Clone)]
pub struct ZslMatches {
    film: Lattice2D,
    substrate: Lattice2D,
    config: ZslConfig,
    levels: VecDeque<(i32, Vec<i32>)>,
    buffer: VecDeque<ZslMatch>,
}

impl ZslMatches {
    fn compute_level(&self, j: i32, film_multiples: &[i32]) -> Vec<ZslMatch> {
        let substrates = reduced_superlattices(&self.substrate, j);
        let mut seen: HashSet<([[i32; 2]; 2], [[i32; 2]; 2])> = HashSet::new();
        let mut matches = Vec::new();

        for &i in film_multiples {
            let films = reduced_superlattices(&self.film, i);
            for (f_coeffs, f_sl) in &films {
                for (s_coeffs, s_sl) in &substrates {
                    // 约化后两侧长短边的顺序可能相反，再试 (b, -a)
                    let s_coeffs = if is_same_vectors(&self.config, f_sl, s_sl) {
                        *s_coeffs
                    } else {
                        let (turned, turned_sl) = quarter_turn(s_coeffs, s_sl);
                        if !is_same_vectors(&self.config, f_sl, &turned_sl) {
                            continue;
                        }
                        turned
                    };
                    if !seen.insert((*f_coeffs, s_coeffs)) {
                        continue;
                    }
                    if let Some(m) = ZslMatch::new(self.film, self.substrate, *f_coeffs, s_coeffs)
                    {
                        matches.push(m);
                    }
                }
            }
        }

        matches.sort_by(|a, b| {
            a.von_mises_strain
                .partial_cmp(&b.von_mises_strain)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.film_transformation.cmp(&b.film_transformation))
                .then(a.substrate_transformation.cmp(&b.substrate_transformation))
        });
        if !matches.is_empty() {
            log::debug!(
                "ZSL: {} match(es) at substrate multiple {} (area {:.2} Å²)",
                matches.len(),
                j,
                matches[0].match_area
            );
        }
        matches
    }
}

impl Iterator for ZslMatches {
    type Item = ZslMatch;

    fn next(&mut self) -> Option<ZslMatch> {
        loop {
            if let Some(m) = self.buffer.pop_front() {
                return Some(m);
            }
            let (j, film_multiples) = self.levels.pop_front()?;
            self.buffer = self.compute_level(j, &film_multiples).into();
        }
    }
}

/// n 倍超晶格的全部 Hermite 正规形 [[a, b], [0, n/a]]，0 ≤ b < n/a
pub fn gen_sl_transform_matrices(n: i32) -> Vec<[[i32; 2]; 2]> {
    let mut out = Vec::new();
    for a in 1..=n {
        if n % a != 0 {
            continue;
        }
        let d = n / a;
        for b in 0..d {
            out.push([[a, b], [0, d]]);
        }
    }
    out
}

/// n 倍超晶格约化后的 (系数, 基矢)
fn reduced_superlattices(lattice: &Lattice2D, n: i32) -> Vec<([[i32; 2]; 2], Lattice2D)> {
    gen_sl_transform_matrices(n)
        .into_iter()
        .map(|t| {
            let (a, b) = reduce_tracked(
                TrackedVector {
                    vector: lattice.combination(t[0]),
                    coeffs: t[0],
                },
                TrackedVector {
                    vector: lattice.combination(t[1]),
                    coeffs: t[1],
                },
            );
            ([a.coeffs, b.coeffs], Lattice2D::new(a.vector, b.vector))
        })
        .collect()
}

/// 基矢换序 (a, b) -> (b, -a)：同一超晶格，保持右手系
fn quarter_turn(coeffs: &[[i32; 2]; 2], lattice: &Lattice2D) -> ([[i32; 2]; 2], Lattice2D) {
    (
        [coeffs[1], [-coeffs[0][0], -coeffs[0][1]]],
        Lattice2D::new(lattice.b, -lattice.a),
    )
}

/// 使用默认面积比容差枚举匹配
pub fn find_matches(
    film: &Lattice2D,
    substrate: &Lattice2D,
    max_area: f64,
    max_length_tol: f64,
    max_angle_tol: f64,
) -> Result<ZslMatches> {
    let config = ZslConfig {
        max_area,
        max_length_tol,
        max_angle_tol,
        ..ZslConfig::default()
    };
    Ok(ZslGenerator::new(config)?.find_matches(film, substrate))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(a: f64) -> Lattice2D {
        Lattice2D::from_parameters(a, a, 90.0)
    }

    #[test]
    fn test_hnf_count_is_divisor_sum() {
        assert_eq!(gen_sl_transform_matrices(1), vec![[[1, 0], [0, 1]]]);
        // σ(4) = 1 + 2 + 4, σ(6) = 1 + 2 + 3 + 6
        assert_eq!(gen_sl_transform_matrices(4).len(), 7);
        assert_eq!(gen_sl_transform_matrices(6).len(), 12);
        for t in gen_sl_transform_matrices(6) {
            assert_eq!(t[0][0] * t[1][1] - t[0][1] * t[1][0], 6);
        }
    }

    #[test]
    fn test_identical_lattices_first_match_is_unit_cell() {
        let hex = Lattice2D::from_parameters(2.5, 2.5, 120.0);
        let first = find_matches(&hex, &hex, 50.0, 0.03, 0.01)
            .unwrap()
            .next()
            .unwrap();
        assert!((first.match_area - hex.area()).abs() < 1e-9);
        assert!(first.von_mises_strain < 1e-12);
    }

    #[test]
    fn test_al_sic_low_strain_match() {
        let sic = square(4.36);
        let al = square(4.05);
        let matches: Vec<ZslMatch> = find_matches(&sic, &al, 800.0, 0.03, 0.01)
            .unwrap()
            .collect();
        assert!(!matches.is_empty());
        assert!(matches
            .iter()
            .any(|m| m.von_mises_strain < 0.05 && m.match_area < 800.0));
        // 3×3 SiC 对 √10×√10 Al
        assert!(matches
            .iter()
            .any(|m| m.film_multiplicity() == 9 && m.substrate_multiplicity() == 10));
    }

    #[test]
    fn test_matches_respect_tolerances_and_area() {
        let film = Lattice2D::from_parameters(3.1, 3.1, 120.0);
        let substrate = square(4.05);
        let config = ZslConfig {
            max_area: 300.0,
            ..ZslConfig::default()
        };
        let gen = ZslGenerator::new(config.clone()).unwrap();
        for m in gen.find_matches(&film, &substrate) {
            assert!(m.match_area <= config.max_area + 1e-9);
            assert!(gen.is_same_vectors(&m.film_sl_vectors, &m.substrate_sl_vectors));
            assert!(m.max_length_mismatch() <= config.max_length_tol + 1e-12);
        }
    }

    #[test]
    fn test_ordered_by_area_then_strain() {
        let film = square(4.36);
        let substrate = square(4.05);
        let matches: Vec<ZslMatch> = find_matches(&film, &substrate, 600.0, 0.03, 0.01)
            .unwrap()
            .collect();
        for pair in matches.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.match_area <= b.match_area + 1e-9);
            if (a.match_area - b.match_area).abs() < 1e-9 {
                assert!(a.von_mises_strain <= b.von_mises_strain + 1e-15);
            }
        }
    }

    #[test]
    fn test_oblique_rectangles_match_unit_cells() {
        let film = Lattice2D::from_parameters(3.0, 5.0, 89.8);
        let substrate = Lattice2D::from_parameters(3.03, 5.05, 90.2);
        let first = find_matches(&film, &substrate, 60.0, 0.03, 0.01)
            .unwrap()
            .next()
            .unwrap();
        assert_eq!(first.film_multiplicity(), 1);
        assert_eq!(first.substrate_multiplicity(), 1);
        assert!((first.match_area - substrate.area()).abs() < 1e-9);
        assert!(first.substrate_sl_vectors.is_right_handed());
        assert!(first.max_length_mismatch() < 0.011);
    }

    #[test]
    fn test_small_area_has_no_matches() {
        let film = square(4.36);
        let substrate = square(4.05);
        assert_eq!(find_matches(&film, &substrate, 1.0, 0.03, 0.01).unwrap().count(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ZslConfig {
            max_length_tol: -0.1,
            ..ZslConfig::default()
        };
        assert!(matches!(
            ZslGenerator::new(config),
            Err(InterfaceError::InvalidArgument(_))
        ));
        let film = square(4.0);
        assert!(find_matches(&film, &film, 0.0, 0.03, 0.01).is_err());
    }

    #[test]
    fn test_no_duplicate_matches() {
        let film = square(3.0);
        let matches: Vec<ZslMatch> = find_matches(&film, &film, 100.0, 0.03, 0.01)
            .unwrap()
            .collect();
        let mut keys = HashSet::new();
        for m in &matches {
            assert!(keys.insert((m.film_transformation, m.substrate_transformation)));
        }
    }
}
