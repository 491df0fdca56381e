//! # interfacer 命令行入口
//!
//! ## 子命令
//! - `screen` - 取向组合筛选（支持目录批量）
//! - `terminations` - 终止面组合与匹配列表
//! - `slab` - 表面 slab 生成
//! - `build` - 共格界面生成
//!
//! ## 依赖关系
//! - 使用 `interfacer::cli` 解析参数，`interfacer::commands` 执行
//! - 使用 `env_logger` 输出库日志（默认 warn，`-v` info，`-vv` debug，`RUST_LOG` 优先）

use clap::Parser;
use env_logger::Env;
use interfacer::cli::Cli;
use interfacer::{commands, utils};

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
