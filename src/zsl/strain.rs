//! # 形变与应变
//!
//! 形变梯度 F → Green–Lagrange 应变 E = ½(FᵀF − I) → von Mises 等效应变。
//!
//! ## 依赖关系
//! - 被 `zsl/matching.rs`, `interface/` 使用
//! - 使用 `nalgebra::Matrix3`

use nalgebra::Matrix3;

/// 形变梯度（列向量约定 v' = F v）
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deformation(pub Matrix3<f64>);

impl Deformation {
    pub fn identity() -> Self {
        Deformation(Matrix3::identity())
    }

    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.0
    }

    pub fn determinant(&self) -> f64 {
        self.0.determinant()
    }

    /// Green–Lagrange 应变张量
    pub fn green_lagrange_strain(&self) -> StrainTensor {
        let f = &self.0;
        StrainTensor(0.5 * (f.transpose() * f - Matrix3::identity()))
    }
}

/// 对称应变张量
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrainTensor(pub Matrix3<f64>);

impl StrainTensor {
    /// 偏应变 ε − tr(ε)/3 · I
    pub fn deviatoric(&self) -> Matrix3<f64> {
        self.0 - Matrix3::identity() * (self.0.trace() / 3.0)
    }

    /// von Mises 等效应变 √(2/3 · dev:dev)
    pub fn von_mises(&self) -> f64 {
        let dev = self.deviatoric();
        (dev.component_mul(&dev).sum() * 2.0 / 3.0).sqrt()
    }
}
