//! # ZSL 晶格匹配模块
//!
//! Zur–McGill 二维超晶格匹配引擎。
//!
//! ## 依赖关系
//! - 被 `surface/`, `analyzer.rs`, `interface/` 使用
//! - 子模块: lattice2d, strain, matching, generator

pub mod generator;
pub mod lattice2d;
pub mod matching;
pub mod strain;

pub use generator::{find_matches, gen_sl_transform_matrices, ZslConfig, ZslGenerator, ZslMatches};
pub use lattice2d::{reduce_vectors, rel_angle, rel_strain, vec_angle, Lattice2D};
pub use matching::ZslMatch;
pub use strain::{Deformation, StrainTensor};
