//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `analyzer.rs`, `interface/`, `export.rs`, `utils/`
//! - 子模块: screen, terminations, slab, build

pub mod build;
pub mod screen;
pub mod slab;
pub mod terminations;

use crate::cli::Commands;
use crate::error::Result;
use crate::models::Structure;
use crate::parsers;
use crate::surface::{AcceptAll, NonPolar, TerminationPolicy};
use crate::utils::output;

use std::path::Path;
use std::sync::Arc;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Screen(args) => screen::execute(args),
        Commands::Terminations(args) => terminations::execute(args),
        Commands::Slab(args) => slab::execute(args),
        Commands::Build(args) => build::execute(args),
    }
}

/// 读取结构并打印概要
pub(crate) fn load_structure(role: &str, path: &Path) -> Result<Structure> {
    let structure = parsers::parse_structure_file(path)?;
    let (a, b, c, alpha, beta, gamma) = structure.lattice.parameters();
    output::print_info(&format!(
        "{} '{}': {} ({} sites), a={:.3} b={:.3} c={:.3} Å, α={:.1} β={:.1} γ={:.1}°",
        role,
        path.display(),
        structure.formula(),
        structure.num_sites(),
        a,
        b,
        c,
        alpha,
        beta,
        gamma
    ));
    Ok(structure)
}

/// 命令行开关对应的终止面策略
pub(crate) fn termination_policy(non_polar: bool) -> Arc<dyn TerminationPolicy> {
    if non_polar {
        Arc::new(NonPolar::default())
    } else {
        Arc::new(AcceptAll)
    }
}
