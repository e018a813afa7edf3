//! # Build Matrix Library / Build Matrix 库
//!
//! This library provides the core functionality for the `build-matrix` tool,
//! which configures, builds and tests a CMake project once for every
//! combination of its custom-SHA-256 and SQLite build options.
//!
//! 此库为 `build-matrix` 工具提供核心功能，
//! 该工具针对自定义 SHA-256 与 SQLite 构建选项的每种组合配置、构建并测试 CMake 项目。
//!
//! ## Modules / 模块
//!
//! - `core` - Data models, configuration, planning and the execution engine
//! - `infra` - Infrastructure services like command execution, file system operations and the run log
//! - `reporting` - Console summary and report files
//! - `cli` - Command-line interface and commands
//!
//! - `core` - 数据模型、配置、执行计划和执行引擎
//! - `infra` - 基础设施服务，如命令执行、文件系统操作和运行日志
//! - `reporting` - 控制台摘要和报告文件
//! - `cli` - 命令行接口和命令

pub mod cli;
pub mod core;
pub mod infra;
pub mod reporting;

// Re-export commonly used items
pub use crate::core::config;
pub use crate::core::execution;
pub use crate::core::models;

// Initialize i18n
rust_i18n::i18n!("locales", fallback = "en");

/// Picks the user interface language.
///
/// An explicitly requested language wins, then the system locale. Each
/// candidate is matched in full first (e.g. "zh-CN"), then by its language
/// part (e.g. "en" from "en-US"); if nothing matches, "en" is used.
///
/// 选择用户界面语言。显式请求的语言优先，其次是系统区域设置。
/// 每个候选先完整匹配（例如 "zh-CN"），再匹配其语言部分（例如 "en-US" 中的 "en"），
/// 都不匹配时使用 "en"。
pub fn select_locale(requested: Option<&str>) -> String {
    let available_locales = rust_i18n::available_locales!();
    let system = sys_locale::get_locale();

    requested
        .map(str::to_string)
        .into_iter()
        .chain(system)
        .find_map(|candidate| {
            if available_locales.contains(&candidate.as_str()) {
                return Some(candidate);
            }
            candidate
                .split('-')
                .next()
                .filter(|lang_code| available_locales.contains(lang_code))
                .map(str::to_string)
        })
        .unwrap_or_else(|| "en".to_string())
}

/// Sets the process-wide UI language, see [`select_locale`].
pub fn init(requested: Option<&str>) -> String {
    let lang = select_locale(requested);
    rust_i18n::set_locale(&lang);
    lang
}
