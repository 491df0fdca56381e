//! # 二维晶格
//!
//! 表面面内晶格 (a, b) 及 Zur–McGill 匹配所需的向量工具：
//! 约化、夹角、相对应变。
//!
//! ## 依赖关系
//! - 被 `zsl/generator.rs`, `zsl/matching.rs`, `surface/slab.rs` 使用
//! - 使用 `nalgebra::Vector2`

use crate::models::Lattice;

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// 约化迭代上限，防止数值退化时死循环
const MAX_REDUCTION_STEPS: usize = 1000;

/// 二维晶格，基矢位于标准取向的 xy 平面内
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lattice2D {
    pub a: Vector2<f64>,
    pub b: Vector2<f64>,
}

impl Lattice2D {
    pub fn new(a: Vector2<f64>, b: Vector2<f64>) -> Self {
        Lattice2D { a, b }
    }

    /// 由长度和夹角（度）构造，a 沿 x
    pub fn from_parameters(a: f64, b: f64, gamma: f64) -> Self {
        let g = gamma.to_radians();
        Lattice2D {
            a: Vector2::new(a, 0.0),
            b: Vector2::new(b * g.cos(), b * g.sin()),
        }
    }

    /// 取三维晶格前两个基矢的 xy 分量
    pub fn from_lattice(lattice: &Lattice) -> Self {
        let m = &lattice.matrix;
        Lattice2D {
            a: Vector2::new(m[0][0], m[0][1]),
            b: Vector2::new(m[1][0], m[1][1]),
        }
    }

    /// 面积
    pub fn area(&self) -> f64 {
        cross(&self.a, &self.b).abs()
    }

    /// a 与 b 的夹角（弧度）
    pub fn angle(&self) -> f64 {
        vec_angle(&self.a, &self.b)
    }

    pub fn lengths(&self) -> [f64; 2] {
        [self.a.norm(), self.b.norm()]
    }

    pub fn is_right_handed(&self) -> bool {
        cross(&self.a, &self.b) > 0.0
    }

    /// 整数组合 n1·a + n2·b
    pub fn combination(&self, coeffs: [i32; 2]) -> Vector2<f64> {
        self.a * coeffs[0] as f64 + self.b * coeffs[1] as f64
    }

    /// 按整数矩阵（行 = 新基矢的系数）生成超晶格
    pub fn superlattice(&self, t: &[[i32; 2]; 2]) -> Lattice2D {
        Lattice2D {
            a: self.combination(t[0]),
            b: self.combination(t[1]),
        }
    }
}

/// 二维叉积（z 分量）
pub fn cross(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    a.x * b.y - a.y * b.x
}

/// 两个向量的夹角（弧度）
pub fn vec_angle(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    let cosang = a.dot(b);
    let sinang = cross(a, b).abs();
    sinang.atan2(cosang)
}

/// 相对长度应变 |v2| / |v1| - 1
pub fn rel_strain(v1: &Vector2<f64>, v2: &Vector2<f64>) -> f64 {
    v2.norm() / v1.norm() - 1.0
}

/// 相对夹角差 angle(set2) / angle(set1) - 1
pub fn rel_angle(set1: &Lattice2D, set2: &Lattice2D) -> f64 {
    set2.angle() / set1.angle() - 1.0
}

/// 同时携带整数系数的基矢，用于约化时追踪超晶格变换
#[derive(Debug, Clone, Copy)]
pub(crate) struct TrackedVector {
    pub vector: Vector2<f64>,
    pub coeffs: [i32; 2],
}

impl TrackedVector {
    fn neg(self) -> Self {
        TrackedVector {
            vector: -self.vector,
            coeffs: [-self.coeffs[0], -self.coeffs[1]],
        }
    }

    fn add(self, other: Self) -> Self {
        TrackedVector {
            vector: self.vector + other.vector,
            coeffs: [
                self.coeffs[0] + other.coeffs[0],
                self.coeffs[1] + other.coeffs[1],
            ],
        }
    }

    fn sub(self, other: Self) -> Self {
        self.add(other.neg())
    }
}

/// Zur–McGill 约化，得到锐角、最短的等价基，并保证右手系
pub(crate) fn reduce_tracked(mut a: TrackedVector, mut b: TrackedVector) -> (TrackedVector, TrackedVector) {
    for _ in 0..MAX_REDUCTION_STEPS {
        if a.vector.dot(&b.vector) < 0.0 {
            b = b.neg();
            continue;
        }
        if a.vector.norm() > b.vector.norm() {
            std::mem::swap(&mut a, &mut b);
            continue;
        }
        if b.vector.norm() > b.add(a).vector.norm() {
            b = b.add(a);
            continue;
        }
        if b.vector.norm() > b.sub(a).vector.norm() {
            b = b.sub(a);
            continue;
        }
        break;
    }
    if cross(&a.vector, &b.vector) < 0.0 {
        std::mem::swap(&mut a, &mut b);
    }
    (a, b)
}

/// 约化一对向量（不追踪系数）
pub fn reduce_vectors(a: Vector2<f64>, b: Vector2<f64>) -> (Vector2<f64>, Vector2<f64>) {
    let (ra, rb) = reduce_tracked(
        TrackedVector {
            vector: a,
            coeffs: [1, 0],
        },
        TrackedVector {
            vector: b,
            coeffs: [0, 1],
        },
    );
    (ra.vector, rb.vector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_area_and_angle() {
        let l = Lattice2D::from_parameters(3.0, 3.0, 120.0);
        assert!((l.area() - 9.0 * 3f64.sqrt() / 2.0).abs() < 1e-10);
        assert!((l.angle() - 2.0 * PI / 3.0).abs() < 1e-12);
        assert!(l.is_right_handed());
    }

    #[test]
    fn test_reduce_keeps_area() {
        let a = Vector2::new(1.0, 0.0);
        let b = Vector2::new(7.0, 1.0);
        let (ra, rb) = reduce_vectors(a, b);
        assert!((cross(&ra, &rb) - 1.0).abs() < 1e-12);
        assert!((ra.norm() - 1.0).abs() < 1e-12);
        assert!((rb.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_reduce_hexagonal_acute() {
        let l = Lattice2D::from_parameters(2.5, 2.5, 120.0);
        let (ra, rb) = reduce_vectors(l.a, l.b);
        assert!(ra.dot(&rb) >= 0.0);
        assert!((vec_angle(&ra, &rb) - PI / 3.0).abs() < 1e-10);
        assert!(cross(&ra, &rb) > 0.0);
    }

    #[test]
    fn test_reduce_tracks_coefficients() {
        let l = Lattice2D::from_parameters(3.0, 4.0, 80.0);
        let (ra, rb) = reduce_tracked(
            TrackedVector {
                vector: l.a * 2.0 + l.b * 3.0,
                coeffs: [2, 3],
            },
            TrackedVector {
                vector: l.a + l.b,
                coeffs: [1, 1],
            },
        );
        assert!((l.combination(ra.coeffs) - ra.vector).norm() < 1e-10);
        assert!((l.combination(rb.coeffs) - rb.vector).norm() < 1e-10);
        let det = ra.coeffs[0] * rb.coeffs[1] - ra.coeffs[1] * rb.coeffs[0];
        assert_eq!(det, 1);
    }

    #[test]
    fn test_rel_strain_and_angle() {
        let v1 = Vector2::new(4.0, 0.0);
        let v2 = Vector2::new(0.0, 4.2);
        assert!((rel_strain(&v1, &v2) - 0.05).abs() < 1e-12);
        let square = Lattice2D::from_parameters(1.0, 1.0, 90.0);
        let hex = Lattice2D::from_parameters(1.0, 1.0, 60.0);
        assert!((rel_angle(&square, &hex) + 1.0 / 3.0).abs() < 1e-12);
    }
}
