//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `screen`: 取向组合筛选（薄膜可为目录，批量并行）
//! - `terminations`: 列出终止面组合与匹配数
//! - `slab`: 生成表面 slab
//! - `build`: 生成共格界面
//!
//! 多个命令共享的 ZSL / slab 参数以 `#[command(flatten)]` 复用。
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: screen, terminations, slab, build

pub mod build;
pub mod screen;
pub mod slab;
pub mod terminations;

use crate::models::MillerIndex;
use crate::surface::SlabConfig;
use crate::zsl::ZslConfig;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Interfacer - 共格界面构建工具
#[derive(Parser)]
#[command(name = "interfacer")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Coherent substrate/film interface construction via ZSL lattice matching", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Rank film/substrate Miller-index pairs by ZSL matching strain
    Screen(screen::ScreenArgs),

    /// List surface termination pairs and ZSL matches for one orientation pair
    Terminations(terminations::TerminationsArgs),

    /// Cut a surface slab from a bulk structure
    Slab(slab::SlabArgs),

    /// Build strained, stacked interface structures
    Build(build::BuildArgs),
}

/// ZSL 匹配参数
#[derive(Args, Debug, Clone)]
pub struct ZslArgs {
    /// Maximum supercell area (Å²)
    #[arg(long, env = "INTERFACER_MAX_AREA", default_value_t = 400.0)]
    pub max_area: f64,

    /// Maximum relative length mismatch of superlattice vectors
    #[arg(long, default_value_t = 0.03)]
    pub max_length_tol: f64,

    /// Maximum relative mismatch of superlattice angles
    #[arg(long, default_value_t = 0.01)]
    pub max_angle_tol: f64,

    /// Tolerance on the film/substrate area ratio
    #[arg(long, default_value_t = 0.09)]
    pub max_area_ratio_tol: f64,
}

impl ZslArgs {
    pub fn to_config(&self) -> ZslConfig {
        ZslConfig {
            max_area: self.max_area,
            max_length_tol: self.max_length_tol,
            max_angle_tol: self.max_angle_tol,
            max_area_ratio_tol: self.max_area_ratio_tol,
        }
    }
}

/// Slab 切割参数
#[derive(Args, Debug, Clone)]
pub struct SlabCutArgs {
    /// Atomic layers closer than this along the normal are one layer (Å)
    #[arg(long, default_value_t = 0.1)]
    pub layer_tolerance: f64,

    /// Position tolerance for symmetry detection (Å)
    #[arg(long, default_value_t = 0.01)]
    pub symprec: f64,

    /// Refuse slabs with more sites than this
    #[arg(long, default_value_t = 20_000)]
    pub max_slab_sites: usize,

    /// Keep only terminations whose layer stacking reads the same from both faces
    #[arg(long, default_value_t = false)]
    pub non_polar: bool,
}

impl SlabCutArgs {
    pub fn to_config(&self) -> SlabConfig {
        SlabConfig {
            layer_tolerance: self.layer_tolerance,
            symprec: self.symprec,
            max_slab_sites: self.max_slab_sites,
        }
    }
}

/// 解析 Miller 指数参数
pub fn parse_miller(input: &str) -> Result<MillerIndex, String> {
    input.parse::<MillerIndex>().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_args() {
        let cli = Cli::try_parse_from([
            "interfacer",
            "-vv",
            "build",
            "Al.vasp",
            "SiC.vasp",
            "--substrate-miller",
            "1,1,1",
            "--film-miller",
            "100",
            "--count",
            "all",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.substrate_miller, MillerIndex::new(1, 1, 1).unwrap());
                assert_eq!(args.film_miller, MillerIndex::new(1, 0, 0).unwrap());
                assert_eq!(args.count.limit(), None);
                assert_eq!(args.film_thickness, 18);
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn test_bad_miller_rejected() {
        assert!(parse_miller("0,0,0").is_err());
        assert!(parse_miller("1,x,0").is_err());
    }
}
