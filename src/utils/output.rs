//! # 美化输出工具
//!
//! 提供统一的终端输出样式。库代码走 `log`，这里只服务于命令行。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块使用
//! - 使用 `colored` crate

use colored::Colorize;
use std::path::Path;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印写出文件消息
pub fn print_written(what: &str, path: &Path) {
    println!(
        "{} {} {} {}",
        "[OK]".green().bold(),
        what.dimmed(),
        "->".cyan(),
        path.display()
    );
}

/// 打印 `键: 值` 形式的参数行
pub fn print_param(key: &str, value: &str) {
    println!("    {:<22} {}", format!("{}:", key).dimmed(), value);
}

/// 应变格式化为百分数（表格用）
pub fn fmt_strain(strain: f64) -> String {
    format!("{:.3}", strain * 100.0)
}

/// 面积格式化（Å²，表格用）
pub fn fmt_area(area: f64) -> String {
    format!("{:.2}", area)
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_strain_percent() {
        assert_eq!(fmt_strain(0.012345), "1.234");
        assert_eq!(fmt_strain(0.0), "0.000");
        assert_eq!(fmt_area(12.345), "12.35");
    }
}
