//! # 解析器模块
//!
//! 结构文件的读写。目前支持 VASP POSCAR/CONTCAR。
//!
//! ## 依赖关系
//! - 被 `commands/`, `batch/` 使用
//! - 使用 `models/` 数据模型
//! - 子模块: poscar

pub mod poscar;

use crate::error::{InterfaceError, Result};
use crate::models::Structure;
use std::path::Path;

/// 可识别的结构文件扩展名
pub const STRUCTURE_EXTENSIONS: &[&str] = &["vasp", "poscar", "contcar"];

/// 路径是否像一个结构文件
pub fn is_structure_file(path: &Path) -> bool {
    let ext_ok = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| STRUCTURE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false);
    let name_ok = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with("POSCAR") || n.starts_with("CONTCAR"))
        .unwrap_or(false);
    ext_ok || name_ok
}

/// 从文件路径推断格式并解析
pub fn parse_structure_file(path: &Path) -> Result<Structure> {
    if !path.exists() {
        return Err(InterfaceError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    if is_structure_file(path) {
        poscar::parse_poscar_file(path)
    } else {
        Err(InterfaceError::UnsupportedFormat(format!(
            "Cannot determine format for: {} (expected POSCAR/CONTCAR or .vasp)",
            path.display()
        )))
    }
}
