//! # build 子命令 CLI 定义
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/build.rs`

use super::{parse_miller, SlabCutArgs, ZslArgs};
use crate::models::MillerIndex;

use clap::Args;
use std::path::PathBuf;

/// build 子命令参数
#[derive(Args, Debug)]
pub struct BuildArgs {
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

    /// Termination pair: index or 'film/substrate' label (default: first)
    #[arg(short, long)]
    pub termination: Option<String>,

    /// Film thickness in oriented-cell layers
    #[arg(long, default_value_t = 18)]
    pub film_thickness: usize,

    /// Substrate thickness in oriented-cell layers
    #[arg(long, default_value_t = 12)]
    pub substrate_thickness: usize,

    /// Film/substrate separation along the normal (Å)
    #[arg(long, default_value_t = 2.0)]
    pub gap: f64,

    /// Vacuum above the film (Å)
    #[arg(long, default_value_t = 20.0)]
    pub vacuum: f64,

    /// In-plane film offset in fractional substrate-supercell units, e.g. 0.5,0
    #[arg(long, value_parser = parse_offset, default_value = "0,0")]
    pub offset: [f64; 2],

    /// Number of interfaces to write, or 'all'
    #[arg(short = 'n', long, value_parser = parse_count, default_value = "10")]
    pub count: Count,

    /// Output directory
    #[arg(short, long, default_value = "output")]
    pub output: PathBuf,

    /// Overwrite existing output files
    #[arg(long, default_value_t = false)]
    pub overwrite: bool,

    #[command(flatten)]
    pub zsl: ZslArgs,

    #[command(flatten)]
    pub slab: SlabCutArgs,
}

/// 界面数量：前 N 个或全部
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Count {
    All,
    First(usize),
}

impl Count {
    pub fn limit(self) -> Option<usize> {
        match self {
            Count::All => None,
            Count::First(n) => Some(n),
        }
    }
}

/// `all` 表示不限数量
pub fn parse_count(input: &str) -> Result<Count, String> {
    if input.eq_ignore_ascii_case("all") {
        return Ok(Count::All);
    }
    match input.parse::<usize>() {
        Ok(0) => Err("count must be at least 1 (or 'all')".to_string()),
        Ok(n) => Ok(Count::First(n)),
        Err(_) => Err(format!("Invalid count '{}' (use a number or 'all')", input)),
    }
}

/// 解析 `x,y` 面内偏移
pub fn parse_offset(input: &str) -> Result<[f64; 2], String> {
    let parts: Vec<f64> = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|_| format!("Invalid offset '{}' (use e.g. 0.5,0)", input))?;
    match parts.as_slice() {
        [x, y] if x.is_finite() && y.is_finite() => Ok([*x, *y]),
        _ => Err(format!("Invalid offset '{}' (need two numbers)", input)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count("all").unwrap(), Count::All);
        assert_eq!(parse_count("5").unwrap().limit(), Some(5));
        assert!(parse_count("0").is_err());
        assert!(parse_count("-1").is_err());
    }

    #[test]
    fn test_parse_offset() {
        let o = parse_offset("0.5, 0.25").unwrap();
        assert!((o[0] - 0.5).abs() < 1e-12 && (o[1] - 0.25).abs() < 1e-12);
        assert!(parse_offset("0.5").is_err());
        assert!(parse_offset("a,b").is_err());
    }
}
