//! # Interfacer - 共格界面构建
//!
//! 在两种晶体（衬底 / 薄膜）的指定晶面之间构建原子级共格的界面结构。
//!
//! ## 组成
//! - `surface` - 取向晶胞、终止面枚举、slab 切割
//! - `zsl` - Zur–McGill 二维超晶格匹配
//! - `analyzer` - 取向组合筛选
//! - `interface` - 薄膜形变、堆叠、界面惰性生成
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── models/     (晶格、结构、Miller 指数)
//!   ├── math.rs     (整数 / 分数坐标工具)
//!   ├── surface/    (slab 生成器)
//!   ├── zsl/        (匹配引擎)
//!   ├── analyzer.rs (取向筛选)
//!   ├── interface/  (界面构建器)
//!   ├── parsers/    (POSCAR 读写)
//!   ├── export.rs / plot.rs (CSV、POSCAR、图表输出)
//!   ├── batch/      (批量并行筛选)
//!   ├── cli/ + commands/ (命令行)
//!   ├── utils/      (终端输出、进度条)
//!   └── error.rs    (错误处理)
//! ```

pub mod analyzer;
pub mod batch;
pub mod cli;
pub mod commands;
pub mod error;
pub mod export;
pub mod interface;
pub mod math;
pub mod models;
pub mod parsers;
pub mod plot;
pub mod surface;
pub mod utils;
pub mod zsl;

pub use analyzer::{ScreeningResult, SubstrateAnalyzer};
pub use error::{InterfaceError, Result};
pub use interface::{CoherentInterfaceBuilder, Interface};
pub use models::{Lattice, MillerIndex, Site, Structure};
pub use surface::{Slab, SlabGenerator};
pub use zsl::{ZslGenerator, ZslMatch};
