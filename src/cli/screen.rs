//! # screen 子命令 CLI 定义
//!
//! 对衬底和薄膜的全部取向组合做 ZSL 匹配并按应变排序。
//! 薄膜参数为目录时批量筛选其中所有结构文件。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/screen.rs`

use super::ZslArgs;

use clap::Args;
use std::path::PathBuf;

/// screen 子命令参数
#[derive(Args, Debug)]
pub struct ScreenArgs {
    /// Substrate structure file (POSCAR/CONTCAR/.vasp)
    pub substrate: PathBuf,

    /// Film structure file, or a directory of candidate films
    pub film: PathBuf,

    /// Largest |h|,|k|,|l| enumerated on the film side
    #[arg(long, default_value_t = 1)]
    pub film_max_miller: i32,

    /// Largest |h|,|k|,|l| enumerated on the substrate side
    #[arg(long, default_value_t = 1)]
    pub substrate_max_miller: i32,

    #[command(flatten)]
    pub zsl: ZslArgs,

    /// Number of rows shown in the result table
    #[arg(short = 'n', long, default_value_t = 10)]
    pub top: usize,

    /// Write the full ranking to this CSV file
    #[arg(long)]
    pub output_csv: Option<PathBuf>,

    /// Write a strain-vs-area scatter plot (.png or .svg)
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// Glob pattern(s) for film files in batch mode (comma separated)
    #[arg(short, long)]
    pub pattern: Option<String>,

    /// Recurse into subdirectories in batch mode
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs in batch mode (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,
}
