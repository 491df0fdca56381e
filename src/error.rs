//! # 统一错误处理模块
//!
//! 定义 interfacer 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// interfacer 统一错误类型
#[derive(Error, Debug)]
pub enum InterfaceError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    // ─────────────────────────────────────────────────────────────
    // 表面 / 匹配算法错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid orientation {miller}: {reason}")]
    InvalidOrientation { miller: String, reason: String },

    #[error("Insufficient bulk: {reason}")]
    InsufficientBulk { reason: String },

    #[error("No terminations found for the {side} surface")]
    NoTerminations { side: String },

    #[error("No ZSL matches within max_area = {max_area:.1} Å² (try a larger area or other Miller indices)")]
    NoMatches { max_area: f64 },

    #[error("Singular deformation for match #{index} (det = {determinant:.3e})")]
    SingularDeformation { index: usize, determinant: f64 },

    #[error("Unknown termination: {0}")]
    UnknownTermination(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ─────────────────────────────────────────────────────────────
    // CSV / 绘图错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Plot error: {0}")]
    PlotError(String),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, InterfaceError>;
