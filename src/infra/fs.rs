//! # File System Operations Module / 文件系统操作模块
//!
//! Path bookkeeping for the runner: locating the project root once at start,
//! wiping the build directory, and handling the captured-output file.
//!
//! 运行器的路径管理：启动时一次性确定项目根目录、清除构建目录，
//! 以及处理捕获输出文件。

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::infra::t;

/// Directory name that marks "we were started from inside the build tree".
pub const BUILD_DIR_NAME: &str = "build";

/// Where the runner decided the project root is.
/// 运行器确定的项目根目录位置。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRoot {
    /// Absolute path of the project root / 项目根目录的绝对路径
    pub path: PathBuf,
    /// `true` if the starting directory was a `build` directory and its parent was taken.
    /// 如果起始目录是 `build` 目录并取其父目录，则为 `true`。
    pub left_build_dir: bool,
}

/// Decides the project root from a starting directory without touching the
/// process working directory: a directory whose base name is `build` yields
/// its parent, anything else is kept.
///
/// # Arguments
/// * `start` - The directory the tool was pointed at
///
/// # Returns
/// The normalized root; `start` is returned unchanged if it has no parent
///
/// 在不改变进程工作目录的情况下，从起始目录确定项目根目录：
/// 基本名称为 `build` 的目录返回其父目录，否则保持不变。
pub fn normalize_project_root(start: &Path) -> ProjectRoot {
    let is_build_dir = start
        .file_name()
        .is_some_and(|name| name == BUILD_DIR_NAME);

    match (is_build_dir, start.parent()) {
        (true, Some(parent)) if !parent.as_os_str().is_empty() => ProjectRoot {
            path: parent.to_path_buf(),
            left_build_dir: true,
        },
        _ => ProjectRoot {
            path: start.to_path_buf(),
            left_build_dir: false,
        },
    }
}

/// Canonicalizes `project_dir` and then normalizes it.
pub fn resolve_project_root(project_dir: &Path) -> Result<ProjectRoot> {
    let absolute = absolute_path(project_dir)?;
    Ok(normalize_project_root(&absolute))
}

/// Removes `dir` and everything below it. A missing directory is not an error.
///
/// 删除 `dir` 及其下的所有内容。目录不存在不视为错误。
pub fn clean_dir(dir: &Path) -> Result<()> {
    fs_extra::dir::remove(dir)
        .with_context(|| t!("fs.clean_failed", path = dir.display()).to_string())
}

/// Reads the captured-output file as text. Invalid UTF-8 is replaced rather
/// than rejected since test binaries may print arbitrary bytes.
///
/// 以文本形式读取捕获输出文件。无效的 UTF-8 会被替换而不是拒绝。
pub fn read_output_file(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| t!("fs.read_output_failed", path = path.display()).to_string())?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

pub fn remove_output_file(path: &Path) -> Result<()> {
    fs::remove_file(path)
        .with_context(|| t!("fs.remove_output_failed", path = path.display()).to_string())
}

/// Returns those of `names` that exist as files directly inside `dir`, in input order.
pub fn existing_files(dir: &Path, names: &[&str]) -> Vec<String> {
    names
        .iter()
        .filter(|name| dir.join(name).is_file())
        .map(|name| name.to_string())
        .collect()
}

/// Checks if a path exists and is a directory.
pub fn is_directory(path: &Path) -> bool {
    path.is_dir()
}

/// Gets the absolute path from a potentially relative path.
///
/// # Arguments
/// * `path` - Path to canonicalize
///
/// # Returns
/// Canonicalized absolute path, or an error if the path doesn't exist
pub fn absolute_path(path: &Path) -> Result<PathBuf> {
    fs::canonicalize(path)
        .with_context(|| t!("fs.project_dir_not_found", path = path.display()).to_string())
}
