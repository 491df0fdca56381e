//! # slab 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/slab.rs`

use super::{parse_miller, SlabCutArgs};
use crate::models::MillerIndex;

use clap::Args;
use std::path::PathBuf;

/// slab 子命令参数
#[derive(Args, Debug)]
pub struct SlabArgs {
    /// Bulk structure file
    pub input: PathBuf,

    /// Surface orientation, e.g. 1,1,0 or 110
    #[arg(short, long, value_parser = parse_miller)]
    pub miller: MillerIndex,

    /// Number of oriented-cell layers
    #[arg(short, long, default_value_t = 4)]
    pub layers: usize,

    /// Vacuum thickness above the slab (Å)
    #[arg(long, default_value_t = 15.0)]
    pub vacuum: f64,

    /// Termination index as listed by this command (default: all)
    #[arg(short, long)]
    pub termination: Option<usize>,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    #[command(flatten)]
    pub slab: SlabCutArgs,
}
