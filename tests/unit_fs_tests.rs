//! # File System Module Unit Tests / 文件系统模块单元测试
//!
//! Tests for project-root detection, build-directory cleanup and the
//! captured-output file helpers.
//!
//! 测试项目根目录检测、构建目录清理以及捕获输出文件的辅助函数。

use build_matrix::infra::fs::{
    clean_dir, existing_files, normalize_project_root, read_output_file, remove_output_file,
    resolve_project_root,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

#[cfg(test)]
mod project_root_tests {
    use super::*;

    #[test]
    fn test_build_dir_yields_parent() {
        let root = normalize_project_root(Path::new("/work/countly-sdk/build"));
        assert_eq!(root.path, Path::new("/work/countly-sdk"));
        assert!(root.left_build_dir);
    }

    #[test]
    fn test_other_dir_is_kept() {
        let root = normalize_project_root(Path::new("/work/countly-sdk"));
        assert_eq!(root.path, Path::new("/work/countly-sdk"));
        assert!(!root.left_build_dir);

        let root = normalize_project_root(Path::new("/work/build-tools"));
        assert!(!root.left_build_dir);
    }

    #[test]
    fn test_bare_build_without_parent_is_kept() {
        let root = normalize_project_root(Path::new("build"));
        assert_eq!(root.path, Path::new("build"));
        assert!(!root.left_build_dir);
    }

    #[test]
    fn test_resolve_from_existing_build_dir() {
        let dir = tempdir().unwrap();
        let build = dir.path().join("build");
        fs::create_dir(&build).unwrap();

        let root = resolve_project_root(&build).unwrap();
        assert_eq!(root.path, fs::canonicalize(dir.path()).unwrap());
        assert!(root.left_build_dir);
    }

    #[test]
    fn test_resolve_missing_dir_is_an_error() {
        build_matrix::init(Some("en"));
        let dir = tempdir().unwrap();
        let err = resolve_project_root(&dir.path().join("missing")).unwrap_err();
        assert!(err.to_string().contains("Project directory not found"));
    }
}

#[cfg(test)]
mod build_dir_tests {
    use super::*;

    #[test]
    fn test_clean_removes_nested_tree() {
        let dir = tempdir().unwrap();
        let build = dir.path().join("build");
        fs::create_dir_all(build.join("CMakeFiles/3.28")).unwrap();
        fs::write(build.join("CMakeFiles/3.28/CMakeCache.txt"), "x").unwrap();
        fs::write(build.join("countly-tests"), "x").unwrap();

        clean_dir(&build).unwrap();
        assert!(!build.exists());
        assert!(dir.path().exists());
    }

    #[test]
    fn test_clean_missing_dir_is_ok() {
        let dir = tempdir().unwrap();
        clean_dir(&dir.path().join("build")).unwrap();
    }

    #[test]
    fn test_existing_files_in_input_order() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("countly-tests"), "").unwrap();
        fs::create_dir(dir.path().join("countly-sample")).unwrap();

        let found = existing_files(dir.path(), &["countly-sample", "countly-tests", "other"]);
        assert_eq!(found, vec!["countly-tests".to_string()]);
    }
}

#[cfg(test)]
mod output_file_tests {
    use super::*;

    #[test]
    fn test_read_replaces_invalid_utf8() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doctest_results.txt");
        fs::write(&path, b"passed \xff\n").unwrap();

        let text = read_output_file(&path).unwrap();
        assert!(text.starts_with("passed "));
        assert!(text.contains('\u{FFFD}'));
    }

    #[test]
    fn test_remove_output_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("doctest_results.txt");
        fs::write(&path, "").unwrap();

        remove_output_file(&path).unwrap();
        assert!(!path.exists());
        assert!(remove_output_file(&path).is_err());
    }
}
