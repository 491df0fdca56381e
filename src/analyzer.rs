//! # 衬底筛选
//!
//! 在给定最大 Miller 指数内枚举薄膜与衬底的全部取向组合，
//! 对每一对做 ZSL 匹配，保留应变最小的匹配，按应变升序排列。
//!
//! 只回答“哪些取向值得进一步构建界面”，与终止面和厚度无关。
//!
//! ## 依赖关系
//! - 被 `commands/screen.rs` 调用
//! - 使用 `surface/` 的取向晶胞和 `zsl/` 的匹配引擎

use crate::error::{InterfaceError, Result};
use crate::math::gcd3;
use crate::models::{MillerIndex, Structure};
use crate::surface::{SlabConfig, SlabGenerator};
use crate::zsl::{Lattice2D, ZslConfig, ZslGenerator, ZslMatch};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 单个取向组合的筛选结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningResult {
    pub film_miller: MillerIndex,
    pub substrate_miller: MillerIndex,
    pub von_mises_strain: f64,
    pub match_area: f64,
    /// 取得最小应变的匹配
    pub best_match: ZslMatch,
    /// 该取向组合的匹配总数
    pub match_count: usize,
}

/// 分量在 [-max, max] 内、已约化的全部 Miller 指数
///
/// 公倍数合并（(2 0 0) 与 (1 0 0) 为同一族），m 与 -m 分别保留。
pub fn distinct_miller_indices(max_index: i32) -> Vec<MillerIndex> {
    let mut out = Vec::new();
    for h in -max_index..=max_index {
        for k in -max_index..=max_index {
            for l in -max_index..=max_index {
                if gcd3(h, k, l) != 1 {
                    continue;
                }
                if let Ok(m) = MillerIndex::new(h, k, l) {
                    out.push(m);
                }
            }
        }
    }
    out
}

/// 衬底筛选器
#[derive(Debug, Clone, Default)]
pub struct SubstrateAnalyzer {
    zsl: ZslConfig,
    slab: SlabConfig,
}

impl SubstrateAnalyzer {
    /// 使用给定 ZSL 容差创建（`max_area` 由 `screen` 指定）
    pub fn new(zsl: ZslConfig) -> Result<Self> {
        zsl.validate()?;
        Ok(SubstrateAnalyzer {
            zsl,
            slab: SlabConfig::default(),
        })
    }

    pub fn with_slab_config(mut self, slab: SlabConfig) -> Result<Self> {
        slab.validate()?;
        self.slab = slab;
        Ok(self)
    }

    pub fn zsl_config(&self) -> &ZslConfig {
        &self.zsl
    }

    /// 筛选全部取向组合
    pub fn screen(
        &self,
        substrate: &Structure,
        film: &Structure,
        film_max_miller: i32,
        substrate_max_miller: i32,
        max_area: f64,
    ) -> Result<Vec<ScreeningResult>> {
        self.screen_with_progress(
            substrate,
            film,
            film_max_miller,
            substrate_max_miller,
            max_area,
            |_, _| {},
        )
    }

    /// 同 `screen`，每完成一个取向组合回调一次 `(done, total)`
    pub fn screen_with_progress<F>(
        &self,
        substrate: &Structure,
        film: &Structure,
        film_max_miller: i32,
        substrate_max_miller: i32,
        max_area: f64,
        mut progress: F,
    ) -> Result<Vec<ScreeningResult>>
    where
        F: FnMut(usize, usize),
    {
        if film_max_miller < 1 || substrate_max_miller < 1 {
            return Err(InterfaceError::InvalidArgument(format!(
                "max Miller index must be at least 1 (film {}, substrate {})",
                film_max_miller, substrate_max_miller
            )));
        }
        let generator = ZslGenerator::new(self.zsl.clone().with_max_area(max_area))?;

        let film_planes = self.in_plane_lattices(film, film_max_miller)?;
        let substrate_planes = self.in_plane_lattices(substrate, substrate_max_miller)?;
        let total = film_planes.len() * substrate_planes.len();

        log::info!(
            "Screening {} film x {} substrate orientations ({} pairs, max area {:.1} Å²)",
            film_planes.len(),
            substrate_planes.len(),
            total,
            max_area
        );

        let mut results = Vec::new();
        let mut done = 0;
        for (film_miller, film_lattice) in &film_planes {
            for (substrate_miller, substrate_lattice) in &substrate_planes {
                if let Some(result) = best_match(
                    &generator,
                    *film_miller,
                    film_lattice,
                    *substrate_miller,
                    substrate_lattice,
                ) {
                    results.push(result);
                }
                done += 1;
                progress(done, total);
            }
        }

        results.sort_by(|a, b| {
            a.von_mises_strain
                .partial_cmp(&b.von_mises_strain)
                .unwrap_or(Ordering::Equal)
                .then(
                    a.match_area
                        .partial_cmp(&b.match_area)
                        .unwrap_or(Ordering::Equal),
                )
        });

        log::info!("{} orientation pair(s) have at least one match", results.len());
        Ok(results)
    }

    fn in_plane_lattices(
        &self,
        structure: &Structure,
        max_miller: i32,
    ) -> Result<Vec<(MillerIndex, Lattice2D)>> {
        distinct_miller_indices(max_miller)
            .into_iter()
            .map(|m| {
                let generator = SlabGenerator::new(structure, m, self.slab.clone())?;
                Ok((m, generator.in_plane_lattice()))
            })
            .collect()
    }
}

/// 一个取向组合的最佳匹配：应变最小，其次面积最小
fn best_match(
    generator: &ZslGenerator,
    film_miller: MillerIndex,
    film: &Lattice2D,
    substrate_miller: MillerIndex,
    substrate: &Lattice2D,
) -> Option<ScreeningResult> {
    let mut best: Option<ZslMatch> = None;
    let mut count = 0;

    for m in generator.find_matches(film, substrate) {
        count += 1;
        if !m.von_mises_strain.is_finite() {
            log::warn!(
                "Skipping match with non-finite strain for film {} / substrate {}",
                film_miller,
                substrate_miller
            );
            continue;
        }
        let better = match &best {
            None => true,
            Some(b) => {
                m.von_mises_strain < b.von_mises_strain
                    || (m.von_mises_strain == b.von_mises_strain && m.match_area < b.match_area)
            }
        };
        if better {
            best = Some(m);
        }
    }

    best.map(|m| ScreeningResult {
        film_miller,
        substrate_miller,
        von_mises_strain: m.von_mises_strain,
        match_area: m.match_area,
        best_match: m,
        match_count: count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;

    #[test]
    fn test_distinct_miller_indices() {
        let one = distinct_miller_indices(1);
        assert_eq!(one.len(), 26);
        // 全偶数分量的 26 个被合并
        assert_eq!(distinct_miller_indices(2).len(), 124 - 26);
        let two = distinct_miller_indices(2);
        assert!(!two.contains(&MillerIndex::new(2, 0, 0).unwrap()));
        assert!(two.contains(&MillerIndex::new(2, 1, 0).unwrap()));
        assert!(two.contains(&MillerIndex::new(-1, 0, 0).unwrap()));
        assert!(two.contains(&MillerIndex::new(1, 0, 0).unwrap()));
    }

    #[test]
    fn test_al_sic_screening() {
        let al = fixtures::fcc("Al", 4.05);
        let sic = fixtures::zincblende("Si", "C", 4.36);
        let analyzer = SubstrateAnalyzer::default();
        let results = analyzer.screen(&al, &sic, 1, 1, 200.0).unwrap();
        assert!(!results.is_empty());

        let hundred = MillerIndex::new(1, 0, 0).unwrap();
        let pair = results
            .iter()
            .find(|r| r.film_miller == hundred && r.substrate_miller == hundred)
            .unwrap();
        assert!(pair.von_mises_strain < 0.05);
        assert!(pair.match_area <= 200.0);

        for w in results.windows(2) {
            assert!(w[0].von_mises_strain <= w[1].von_mises_strain);
        }
        assert!(results.iter().all(|r| r.von_mises_strain.is_finite()));
    }

    #[test]
    fn test_tiny_area_gives_empty_result() {
        let al = fixtures::fcc("Al", 4.05);
        let sic = fixtures::zincblende("Si", "C", 4.36);
        let results = SubstrateAnalyzer::default()
            .screen(&al, &sic, 1, 1, 1.0)
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_progress_reports_every_pair() {
        let po = fixtures::simple_cubic("Po", 3.35);
        let mut calls = 0;
        let mut last = (0, 0);
        SubstrateAnalyzer::default()
            .screen_with_progress(&po, &po, 1, 1, 50.0, |done, total| {
                calls += 1;
                last = (done, total);
            })
            .unwrap();
        assert_eq!(calls, 26 * 26);
        assert_eq!(last, (676, 676));
    }

    #[test]
    fn test_invalid_parameters() {
        let po = fixtures::simple_cubic("Po", 3.35);
        let analyzer = SubstrateAnalyzer::default();
        assert!(analyzer.screen(&po, &po, 0, 1, 100.0).is_err());
        assert!(analyzer.screen(&po, &po, 1, 1, -5.0).is_err());
    }
}
