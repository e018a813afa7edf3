//! # Build Script for Translation Checks / 翻译检查构建脚本
//!
//! Parses every `.toml` file in `locales/` and warns about keys that are
//! missing from, or unknown to, the base language file (`en.toml`).
//! `rust-i18n` falls back to English at runtime, so gaps are warnings rather
//! than hard errors.
//!
//! 解析 `locales/` 目录中的每个 `.toml` 文件，并对基础语言文件（`en.toml`）
//! 中缺失或未知的键发出警告。`rust-i18n` 在运行时会回退到英文，因此缺口只作为警告。

use serde::Deserialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One translation file: nested tables whose leaves are strings.
///
/// 一个翻译文件：叶子为字符串的嵌套表。
#[derive(Debug, Deserialize)]
struct Translations(toml::Table);

/// Flattens nested tables into dotted keys (`run.done`).
///
/// 将嵌套表展开为点分键（`run.done`）。
fn flatten_keys(prefix: &str, table: &toml::Table, out: &mut BTreeSet<String>) {
    for (key, value) in table {
        let full = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(inner) => flatten_keys(&full, inner, out),
            _ => {
                out.insert(full);
            }
        }
    }
}

fn load_keys(path: &Path) -> BTreeSet<String> {
    let content = fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("Failed to read {:?}: {}", path, e));
    let translations: Translations =
        toml::from_str(&content).unwrap_or_else(|e| panic!("Failed to parse {:?}: {}", path, e));
    let mut keys = BTreeSet::new();
    flatten_keys("", &translations.0, &mut keys);
    keys
}

fn main() -> std::io::Result<()> {
    println!("cargo:rerun-if-changed=locales/");

    let locales_dir = Path::new("locales");
    let base_keys = load_keys(&locales_dir.join("en.toml"));

    let mut lang_files: Vec<PathBuf> = fs::read_dir(locales_dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml"))
        .filter(|path| path.file_stem().and_then(|s| s.to_str()) != Some("en"))
        .collect();
    lang_files.sort();

    for path in &lang_files {
        let keys = load_keys(path);
        for missing in base_keys.difference(&keys) {
            println!(
                "cargo:warning=Key '{}' is missing from {:?}, English is used instead.",
                missing, path
            );
        }
        for unknown in keys.difference(&base_keys) {
            println!(
                "cargo:warning=Key '{}' in {:?} not found in base (en.toml).",
                unknown, path
            );
        }
    }

    Ok(())
}
