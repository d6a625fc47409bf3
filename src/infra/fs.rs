//! # File System Operations Module / 文件系统操作模块
//!
//! This module provides small file system helpers used when reading the
//! suite configuration and writing the report.
//!
//! 此模块提供读取套件配置和写入报告时使用的文件系统辅助函数。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Creates the parent directories of `path` when they do not exist yet.
///
/// # Arguments
/// * `path` - Path of a file about to be written
pub fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !is_directory(parent) => {
            fs::create_dir_all(parent)
        }
        _ => Ok(()),
    }
}

/// Checks if a path exists and is a directory.
///
/// # Arguments
/// * `path` - Path to check
///
/// # Returns
/// `true` if the path exists and is a directory, `false` otherwise
pub fn is_directory(path: &Path) -> bool {
    path.exists() && path.is_dir()
}

/// Resolves `path` against the current directory for display, falling back
/// to the path as given when it cannot be canonicalized (e.g. it does not
/// exist yet).
pub fn display_path(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
