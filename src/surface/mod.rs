//! # 表面模块
//!
//! 取向晶胞、对称操作、终止面枚举和 slab 构造。
//!
//! ## 依赖关系
//! - 被 `analyzer.rs`, `interface/`, `commands/` 使用
//! - 子模块: orient, symmetry, termination, slab

pub mod orient;
pub mod slab;
pub mod symmetry;
pub mod termination;

pub use orient::{oriented_cell, OrientedCell};
pub use slab::{build_slab, generate_terminations, Slab, SlabConfig, SlabGenerator};
pub use symmetry::{find_symmetry_operations, SymmetryOperation};
pub use termination::{AcceptAll, NonPolar, SurfaceTermination, Termination, TerminationPolicy};
