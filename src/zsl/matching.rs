//! # ZSL 匹配结果
//!
//! 一对共格超晶格：薄膜与衬底各自的超晶格基矢（原面内基矢的整数组合），
//! 匹配面积，以及把薄膜超晶格映射到衬底超晶格的形变矩阵。
//!
//! ## 依赖关系
//! - 被 `zsl/generator.rs`, `analyzer.rs`, `interface/` 使用
//! - 使用 `zsl/lattice2d.rs`, `zsl/strain.rs`

use crate::math::EPS;
use crate::zsl::lattice2d::{cross, Lattice2D};
use crate::zsl::strain::Deformation;

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// 一个 ZSL 匹配，构造后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZslMatch {
    /// 薄膜原面内基矢
    pub film_vectors: Lattice2D,
    /// 衬底原面内基矢
    pub substrate_vectors: Lattice2D,
    /// 薄膜超晶格基矢
    pub film_sl_vectors: Lattice2D,
    /// 衬底超晶格基矢
    pub substrate_sl_vectors: Lattice2D,
    /// 薄膜超晶格系数（行 = 超晶格基矢在原基下的整数系数）
    pub film_transformation: [[i32; 2]; 2],
    /// 衬底超晶格系数
    pub substrate_transformation: [[i32; 2]; 2],
    /// 匹配面积（衬底超晶格面积，Å²）
    pub match_area: f64,
    /// 形变梯度 F，满足 F · film_sl = substrate_sl，法向保持薄膜法向长度
    pub match_transformation: Matrix3<f64>,
    /// F 的 Green–Lagrange 应变的 von Mises 等效值
    pub von_mises_strain: f64,
}

impl ZslMatch {
    /// 由原基矢和整数系数构造匹配
    ///
    /// 薄膜超晶格退化（面积为零）时返回 `None`。
    pub fn new(
        film_vectors: Lattice2D,
        substrate_vectors: Lattice2D,
        film_transformation: [[i32; 2]; 2],
        substrate_transformation: [[i32; 2]; 2],
    ) -> Option<Self> {
        let film_sl = film_vectors.superlattice(&film_transformation);
        let substrate_sl = substrate_vectors.superlattice(&substrate_transformation);
        let match_transformation = match_transformation(&film_sl, &substrate_sl)?;
        let von_mises_strain = Deformation(match_transformation)
            .green_lagrange_strain()
            .von_mises();

        Some(ZslMatch {
            film_vectors,
            substrate_vectors,
            film_sl_vectors: film_sl,
            substrate_sl_vectors: substrate_sl,
            film_transformation,
            substrate_transformation,
            match_area: substrate_sl.area(),
            match_transformation,
            von_mises_strain,
        })
    }

    /// 薄膜超晶格相对原胞的倍数
    pub fn film_multiplicity(&self) -> i32 {
        det2(&self.film_transformation).abs()
    }

    /// 衬底超晶格相对原胞的倍数
    pub fn substrate_multiplicity(&self) -> i32 {
        det2(&self.substrate_transformation).abs()
    }

    /// 薄膜三维超胞矩阵（c 方向不变）
    pub fn film_supercell_matrix(&self) -> [[i32; 3]; 3] {
        embed(&self.film_transformation)
    }

    /// 衬底三维超胞矩阵（c 方向不变）
    pub fn substrate_supercell_matrix(&self) -> [[i32; 3]; 3] {
        embed(&self.substrate_transformation)
    }

    pub fn deformation(&self) -> Deformation {
        Deformation(self.match_transformation)
    }

    /// 超晶格基矢长度的最大相对失配
    pub fn max_length_mismatch(&self) -> f64 {
        let f = self.film_sl_vectors.lengths();
        let s = self.substrate_sl_vectors.lengths();
        (0..2)
            .map(|i| (s[i] / f[i] - 1.0).abs())
            .fold(0.0, f64::max)
    }
}

/// 求 F 使 F f_i = s_i，法向映射到同长度法向
fn match_transformation(film: &Lattice2D, substrate: &Lattice2D) -> Option<Matrix3<f64>> {
    let film_normal = cross(&film.a, &film.b);
    if film_normal.abs() < EPS {
        return None;
    }
    let sub_normal = cross(&substrate.a, &substrate.b);
    let scaled_sub_normal = sub_normal.signum() * film_normal.abs();

    let film_cols = Matrix3::from_columns(&[
        Vector3::new(film.a.x, film.a.y, 0.0),
        Vector3::new(film.b.x, film.b.y, 0.0),
        Vector3::new(0.0, 0.0, film_normal),
    ]);
    let sub_cols = Matrix3::from_columns(&[
        Vector3::new(substrate.a.x, substrate.a.y, 0.0),
        Vector3::new(substrate.b.x, substrate.b.y, 0.0),
        Vector3::new(0.0, 0.0, scaled_sub_normal),
    ]);
    let inv = film_cols.try_inverse()?;
    Some(sub_cols * inv)
}

fn det2(m: &[[i32; 2]; 2]) -> i32 {
    m[0][0] * m[1][1] - m[0][1] * m[1][0]
}

fn embed(m: &[[i32; 2]; 2]) -> [[i32; 3]; 3] {
    [[m[0][0], m[0][1], 0], [m[1][0], m[1][1], 0], [0, 0, 1]]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(a: f64) -> Lattice2D {
        Lattice2D::from_parameters(a, a, 90.0)
    }

    #[test]
    fn test_identical_lattices_zero_strain() {
        let m = ZslMatch::new(square(4.0), square(4.0), [[1, 0], [0, 1]], [[1, 0], [0, 1]])
            .unwrap();
        assert!(m.von_mises_strain < 1e-12);
        assert!((m.match_area - 16.0).abs() < 1e-12);
        assert!((m.match_transformation - Matrix3::identity()).norm() < 1e-12);
    }

    #[test]
    fn test_deformation_maps_film_onto_substrate() {
        let m = ZslMatch::new(
            square(4.36),
            square(4.05),
            [[3, 0], [0, 3]],
            [[1, 3], [-3, 1]],
        )
        .unwrap();
        let f = m.match_transformation;
        for (fv, sv) in [
            (m.film_sl_vectors.a, m.substrate_sl_vectors.a),
            (m.film_sl_vectors.b, m.substrate_sl_vectors.b),
        ] {
            let mapped = f * Vector3::new(fv.x, fv.y, 0.0);
            assert!((mapped.x - sv.x).abs() < 1e-9);
            assert!((mapped.y - sv.y).abs() < 1e-9);
            assert!(mapped.z.abs() < 1e-12);
        }
        assert!((f[(2, 2)] - 1.0).abs() < 1e-12);
        assert_eq!(m.film_multiplicity(), 9);
        assert_eq!(m.substrate_multiplicity(), 10);
        assert!((m.match_area - 10.0 * 4.05 * 4.05).abs() < 1e-9);
        // 面内等双轴 λ = √10·4.05 / (3·4.36)
        let lambda = 10f64.sqrt() * 4.05 / (3.0 * 4.36);
        let e = 0.5 * (lambda * lambda - 1.0);
        assert!((m.von_mises_strain - 2.0 * e.abs() / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_film_rejected() {
        assert!(ZslMatch::new(square(4.0), square(4.0), [[1, 1], [2, 2]], [[1, 0], [0, 1]])
            .is_none());
    }

    #[test]
    fn test_supercell_matrix_embedding() {
        let m = ZslMatch::new(square(4.0), square(4.0), [[2, 1], [0, 1]], [[1, 0], [1, 2]])
            .unwrap();
        assert_eq!(m.film_supercell_matrix(), [[2, 1, 0], [0, 1, 0], [0, 0, 1]]);
        assert_eq!(m.substrate_supercell_matrix()[2], [0, 0, 1]);
    }
}
