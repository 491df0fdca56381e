//! # 批量处理模块
//!
//! 一个衬底对一目录候选薄膜的批量筛选。
//!
//! ## 功能
//! - 自动检测输入类型（文件/目录）
//! - 按 glob 模式收集结构文件
//! - 并行处理，每个任务持有自己的分析器
//! - 进度反馈与统计
//!
//! ## 依赖关系
//! - 被 `commands/screen.rs` 使用
//! - 使用 `rayon` 进行并行处理
//! - 使用 `indicatif` 显示进度

pub mod collector;
pub mod runner;

pub use collector::FileCollector;
pub use runner::{BatchResult, BatchRunner, ProcessResult};
