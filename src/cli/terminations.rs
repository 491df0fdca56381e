//! # terminations 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/terminations.rs`

use super::{parse_miller, SlabCutArgs, ZslArgs};
use crate::models::MillerIndex;

use clap::Args;
use std::path::PathBuf;

/// terminations 子命令参数
#[derive(Args, Debug)]
pub struct TerminationsArgs {
    /// Substrate structure file
    pub substrate: PathBuf,

    /// Film structure file
    pub film: PathBuf,

    /// Substrate surface orientation, e.g. 1,1,1 or 111
    #[arg(long, value_parser = parse_miller)]
    pub substrate_miller: MillerIndex,

    /// Film surface orientation
    #[arg(long, value_parser = parse_miller)]
    pub film_miller: MillerIndex,

    #[command(flatten)]
    pub zsl: ZslArgs,

    #[command(flatten)]
    pub slab: SlabCutArgs,

    /// Also list the first N matches
    #[arg(long, default_value_t = 10)]
    pub show_matches: usize,
}
