//! # 文件收集器
//!
//! 根据输入路径和模式收集待处理的结构文件。
//!
//! ## 功能
//! - 支持单文件和目录输入
//! - glob 模式匹配（逗号分隔多模式），未给模式时按结构文件名识别
//! - 递归目录搜索
//!
//! ## 依赖关系
//! - 被 `commands/screen.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配文件名

use crate::error::{InterfaceError, Result};
use crate::parsers;

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 文件收集器
pub struct FileCollector {
    /// 输入路径
    input: PathBuf,
    /// 匹配模式列表，空表示按结构文件名识别
    patterns: Vec<glob::Pattern>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            patterns: Vec::new(),
            recursive: false,
        }
    }

    /// 设置匹配模式（逗号分隔的多模式）
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self> {
        self.patterns = pattern
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                glob::Pattern::new(s).map_err(|e| {
                    InterfaceError::InvalidArgument(format!("Invalid pattern '{}': {}", s, e))
                })
            })
            .collect::<Result<_>>()?;
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 收集所有匹配的文件（按路径排序）
    pub fn collect(&self) -> Result<Vec<PathBuf>> {
        if self.input.is_file() {
            return Ok(vec![self.input.clone()]);
        }

        if !self.input.is_dir() {
            return Err(InterfaceError::FileNotFound {
                path: self.input.display().to_string(),
            });
        }

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files: Vec<PathBuf> = WalkDir::new(&self.input)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|entry| self.matches(entry.path()))
            .map(|e| e.path().to_path_buf())
            .collect();

        files.sort();
        Ok(files)
    }

    fn matches(&self, path: &Path) -> bool {
        if self.patterns.is_empty() {
            return parsers::is_structure_file(path);
        }
        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => return false,
        };
        self.patterns.iter().any(|p| p.matches(filename))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("interfacer_{}_{}", tag, std::process::id()));
        fs::create_dir_all(dir.join("nested")).unwrap();
        for name in ["Al.vasp", "POSCAR_Cu", "notes.txt", "nested/SiC.vasp"] {
            fs::write(dir.join(name), "x").unwrap();
        }
        dir
    }

    #[test]
    fn test_collect_structure_files() {
        let dir = scratch_dir("collect");
        let flat = FileCollector::new(dir.clone()).collect().unwrap();
        assert_eq!(flat.len(), 2);

        let deep = FileCollector::new(dir.clone()).recursive(true).collect().unwrap();
        assert_eq!(deep.len(), 3);

        let vasp = FileCollector::new(dir.clone())
            .with_pattern("*.vasp, *.txt")
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(vasp.len(), 2);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(FileCollector::new(PathBuf::from(".")).with_pattern("[").is_err());
    }

    #[test]
    fn test_missing_input() {
        let c = FileCollector::new(PathBuf::from("/nonexistent/films"));
        assert!(matches!(c.collect(), Err(InterfaceError::FileNotFound { .. })));
    }
}
