//! # 共格界面模块
//!
//! 终止面组合、匹配复用与界面结构的惰性生成。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 子模块: builder, structure, energy

pub mod builder;
pub mod energy;
pub mod structure;

pub use builder::{BuilderStatus, CoherentInterfaceBuilder, InterfaceConfig, Interfaces};
pub use energy::{rank_by_energy, EnergyEvaluator, RankedInterface};
pub use structure::Interface;
