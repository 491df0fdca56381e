//! # 空间群对称操作搜索
//!
//! 仅用于终止面去重：找出保持结构不变的 (R, t) 操作，
//! 其中 R 是分数坐标下的整数旋转矩阵，t 是分数平移。
//!
//! ## 算法
//! 1. 枚举元素取 {-1, 0, 1} 的整数矩阵 R，保留满足 Rᵀ G R = G 的
//! 2. 对每个 R，以原子数最少的元素为锚点生成候选平移 t = f_j - R f_0
//! 3. 检查所有位点在 R, t 作用下映射到同种元素的位点
//!
//! ## 依赖关系
//! - 被 `surface/slab.rs` 调用
//! - 使用 `models/structure.rs`

use crate::math::{int_matrix, min_image_diff, vec3, wrap_frac3};
use crate::models::Structure;

use std::collections::HashMap;

/// 对称操作 f' = R f + t（分数坐标，列向量约定）
#[derive(Debug, Clone, PartialEq)]
pub struct SymmetryOperation {
    pub rotation: [[i32; 3]; 3],
    pub translation: [f64; 3],
}

impl SymmetryOperation {
    /// 作用于分数坐标
    pub fn apply(&self, frac: [f64; 3]) -> [f64; 3] {
        let r = &self.rotation;
        let mut out = [0.0; 3];
        for i in 0..3 {
            out[i] = r[i][0] as f64 * frac[0]
                + r[i][1] as f64 * frac[1]
                + r[i][2] as f64 * frac[2]
                + self.translation[i];
        }
        out
    }

    /// 是否为纯平移（R = I）
    pub fn is_translation(&self) -> bool {
        self.rotation == [[1, 0, 0], [0, 1, 0], [0, 0, 1]]
    }

    /// 换到新基矢下表示。新晶格 L' = P L（P 为行整数变换，|det P| = 1）
    ///
    /// 由 f = Pᵀ f' 得 R' = P⁻ᵀ R Pᵀ, t' = P⁻ᵀ t。
    pub fn in_basis(&self, p: &[[i32; 3]; 3]) -> Option<SymmetryOperation> {
        let pt = int_matrix(p).transpose();
        let pt_inv = pt.try_inverse()?;
        let r = pt_inv * int_matrix(&self.rotation) * pt;

        let mut rotation = [[0i32; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                let v = r[(i, j)];
                if (v - v.round()).abs() > 1e-6 {
                    return None;
                }
                rotation[i][j] = v.round() as i32;
            }
        }
        let t = pt_inv * vec3(self.translation);
        Some(SymmetryOperation {
            rotation,
            translation: wrap_frac3([t.x, t.y, t.z]),
        })
    }
}

/// 搜索结构的全部对称操作
///
/// `symprec` 为笛卡尔容差（Å）。空结构返回空列表。
pub fn find_symmetry_operations(structure: &Structure, symprec: f64) -> Vec<SymmetryOperation> {
    if structure.sites.is_empty() {
        return Vec::new();
    }

    let lattice = &structure.lattice;
    let metric = lattice.metric();
    let max_len = lattice.lengths().iter().cloned().fold(0.0, f64::max);
    let metric_tol = 2.0 * symprec * max_len;

    // 原子数最少的元素作为锚点，减少候选平移
    let mut by_species: HashMap<&str, Vec<usize>> = HashMap::new();
    for (i, s) in structure.sites.iter().enumerate() {
        by_species.entry(s.species.as_str()).or_default().push(i);
    }
    let anchor_group = by_species
        .values()
        .min_by_key(|v| v.len())
        .cloned()
        .unwrap_or_default();
    let anchor = anchor_group[0];

    let mut ops = Vec::new();

    for code in 0..19683u32 {
        let rotation = decode_rotation(code);
        let r = int_matrix(&rotation);
        let diff = r.transpose() * metric * r - metric;
        if diff.iter().any(|x| x.abs() > metric_tol) {
            continue;
        }

        let mut translations: Vec<[f64; 3]> = Vec::new();
        for &j in &anchor_group {
            let base = SymmetryOperation {
                rotation,
                translation: [0.0; 3],
            }
            .apply(structure.sites[anchor].frac_coords);
            let f_j = structure.sites[j].frac_coords;
            let t = wrap_frac3([f_j[0] - base[0], f_j[1] - base[1], f_j[2] - base[2]]);

            if translations
                .iter()
                .any(|u| lattice.is_periodic_image(*u, t, symprec))
            {
                continue;
            }

            let op = SymmetryOperation {
                rotation,
                translation: t,
            };
            if maps_onto_itself(structure, &op, symprec) {
                translations.push(t);
                ops.push(op);
            }
        }
    }

    log::debug!(
        "Found {} symmetry operations for {}",
        ops.len(),
        structure.formula()
    );
    ops
}

/// 把 0..3^9 的编码解成元素取 {-1, 0, 1} 的矩阵
fn decode_rotation(mut code: u32) -> [[i32; 3]; 3] {
    let mut m = [[0i32; 3]; 3];
    for row in m.iter_mut() {
        for x in row.iter_mut() {
            *x = (code % 3) as i32 - 1;
            code /= 3;
        }
    }
    m
}

/// 检查 op 是否把每个位点映射到同种元素的位点
fn maps_onto_itself(structure: &Structure, op: &SymmetryOperation, symprec: f64) -> bool {
    structure.sites.iter().all(|site| {
        let image = op.apply(site.frac_coords);
        structure.sites.iter().any(|other| {
            other.species == site.species && {
                let d = structure
                    .lattice
                    .frac_to_cart(min_image_diff(image, other.frac_coords));
                (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt() < symprec
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures;

    #[test]
    fn test_simple_cubic_point_group() {
        let s = fixtures::simple_cubic("Po", 3.0);
        let ops = find_symmetry_operations(&s, 0.01);
        // m-3m
        assert_eq!(ops.len(), 48);
    }

    #[test]
    fn test_fcc_conventional_has_centering() {
        let s = fixtures::fcc("Al", 4.05);
        let ops = find_symmetry_operations(&s, 0.01);
        assert_eq!(ops.len(), 48 * 4);
        let pure_translations = ops.iter().filter(|op| op.is_translation()).count();
        assert_eq!(pure_translations, 4);
    }

    #[test]
    fn test_zincblende_no_inversion() {
        let s = fixtures::zincblende("Si", "C", 4.36);
        let ops = find_symmetry_operations(&s, 0.01);
        // -43m 点群 24 个操作 × 4 个面心平移
        assert_eq!(ops.len(), 24 * 4);
        let inversion = [[-1, 0, 0], [0, -1, 0], [0, 0, -1]];
        assert!(ops.iter().all(|op| op.rotation != inversion));
    }

    #[test]
    fn test_in_basis_identity() {
        let op = SymmetryOperation {
            rotation: [[1, 0, 0], [0, 1, 0], [0, 0, 1]],
            translation: [0.5, 0.5, 0.0],
        };
        let p = [[0, 1, 0], [0, 0, 1], [1, 0, 0]];
        let t = op.in_basis(&p).unwrap();
        assert!(t.is_translation());
        // f' = P⁻ᵀ f：新 (x, y, z) = 旧 (y, z, x)
        assert!((t.translation[0] - 0.5).abs() < 1e-12);
        assert!(t.translation[1].abs() < 1e-12);
        assert!((t.translation[2] - 0.5).abs() < 1e-12);
    }
}
