//! # Configuration Module / 配置模块
//!
//! Loads the optional `BuildMatrix.toml`. Every field has a default, and the
//! defaults reproduce the stock behaviour: `cmake` + `make`, a `build`
//! directory next to the sources, `test_results.log` and
//! `doctest_results.txt`.
//!
//! 加载可选的 `BuildMatrix.toml`。每个字段都有默认值，
//! 默认值复现标准行为。

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use crate::infra::logger::LogLevel;
use crate::infra::t;

/// The configuration file looked up in the project directory when `--config` is not given.
/// 未指定 `--config` 时在项目目录中查找的配置文件。
pub const DEFAULT_CONFIG_FILE: &str = "BuildMatrix.toml";

/// Top-level configuration of a matrix run.
/// 矩阵运行的顶级配置。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MatrixConfig {
    /// The language for console messages (e.g., "en", "zh-CN").
    /// Falls back to the system locale when not specified.
    ///
    /// 控制台消息的语言（例如 "en", "zh-CN"）。未指定时使用系统区域设置。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// When `true`, the first failing external step aborts the run.
    /// When `false`, failures are recorded and the matrix continues.
    ///
    /// 为 `true` 时，第一个失败的外部步骤会中止运行。
    /// 为 `false` 时，失败会被记录，矩阵继续执行。
    pub strict: bool,
    /// Build directory, relative to the project root. Removed on every iteration.
    /// 构建目录，相对于项目根目录。每次迭代都会被删除。
    pub build_dir: String,
    /// Log file, relative to the project root. Opened in append mode.
    /// 日志文件，相对于项目根目录。以追加模式打开。
    pub log_file: String,
    /// Minimum level written to the log file.
    pub log_level: LogLevel,
    pub tools: ToolsConfig,
    pub targets: TargetsConfig,
    pub test_run: TestRunConfig,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            language: None,
            strict: false,
            build_dir: "build".to_string(),
            log_file: "test_results.log".to_string(),
            log_level: LogLevel::Info,
            tools: ToolsConfig::default(),
            targets: TargetsConfig::default(),
            test_run: TestRunConfig::default(),
        }
    }
}

/// External tool command lines. Each one is shell-expanded and then split
/// with shell quoting rules, so `"sh ./fake-cmake.sh"` is a valid value.
///
/// 外部工具命令行。每个命令行先进行 shell 展开，再按 shell 引号规则拆分。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    /// Build-file generator / 构建文件生成器
    pub configure: String,
    /// Build tool / 构建工具
    pub build: String,
    /// Extra arguments passed to the generator before `-B <build_dir> .`.
    pub configure_args: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            configure: "cmake".to_string(),
            build: "make".to_string(),
            configure_args: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TargetsConfig {
    pub sample: String,
    /// Also the file name of the test executable inside the build directory.
    /// 同时也是构建目录中测试可执行文件的文件名。
    pub tests: String,
}

impl Default for TargetsConfig {
    fn default() -> Self {
        Self {
            sample: "countly-sample".to_string(),
            tests: "countly-tests".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TestRunConfig {
    /// File inside the build directory receiving the test binary's combined output.
    /// 构建目录中接收测试二进制合并输出的文件。
    pub output_file: String,
    /// Optional limit on the test executable's run time, in seconds.
    /// 测试可执行文件运行时间的可选上限（秒）。
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for TestRunConfig {
    fn default() -> Self {
        Self {
            output_file: "doctest_results.txt".to_string(),
            timeout_secs: None,
        }
    }
}

impl TestRunConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

impl MatrixConfig {
    /// Parses a configuration from TOML text and validates it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MatrixConfig =
            toml::from_str(content).with_context(|| t!("config.parse_failed").to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the runner cannot act on safely.
    ///
    /// 拒绝运行器无法安全处理的值。
    pub fn validate(&self) -> Result<()> {
        if self.tools.configure.trim().is_empty() {
            bail!("{}", t!("config.empty_field", field = "tools.configure"));
        }
        if self.tools.build.trim().is_empty() {
            bail!("{}", t!("config.empty_field", field = "tools.build"));
        }
        if self.targets.sample.trim().is_empty() {
            bail!("{}", t!("config.empty_field", field = "targets.sample"));
        }
        if self.targets.tests.trim().is_empty() {
            bail!("{}", t!("config.empty_field", field = "targets.tests"));
        }
        if self.log_file.trim().is_empty() {
            bail!("{}", t!("config.empty_field", field = "log_file"));
        }

        // The build directory is deleted recursively, so it must stay below the project root.
        let build_dir = Path::new(&self.build_dir);
        let stays_inside = !self.build_dir.is_empty()
            && build_dir
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !stays_inside {
            bail!("{}", t!("config.invalid_build_dir", path = &self.build_dir));
        }

        if !is_plain_file_name(&self.test_run.output_file) {
            bail!(
                "{}",
                t!("config.invalid_output_file", name = &self.test_run.output_file)
            );
        }
        if !is_plain_file_name(&self.targets.tests) {
            bail!("{}", t!("config.invalid_output_file", name = &self.targets.tests));
        }
        Ok(())
    }
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Loads and validates a configuration file.
///
/// # Arguments
/// * `path` - Path to the TOML file
///
/// # Returns
/// The parsed `MatrixConfig`, or an error if the file cannot be read or is invalid
pub fn load_matrix_config(path: &Path) -> Result<MatrixConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| t!("config.read_failed", path = path.display()).to_string())?;
    MatrixConfig::from_toml_str(&content)
}

/// Resolves the configuration for a run.
///
/// An explicit path must exist. Without one, `BuildMatrix.toml` in the project
/// directory is used when present, otherwise the built-in defaults.
///
/// 解析运行所用的配置。显式指定的路径必须存在；未指定时，若项目目录中存在
/// `BuildMatrix.toml` 则使用之，否则使用内置默认值。
pub fn resolve_config(
    explicit: Option<&Path>,
    project_dir: &Path,
) -> Result<(MatrixConfig, Option<PathBuf>)> {
    if let Some(path) = explicit {
        let path = fs::canonicalize(path)
            .with_context(|| t!("config.read_failed", path = path.display()).to_string())?;
        return Ok((load_matrix_config(&path)?, Some(path)));
    }

    let implicit = project_dir.join(DEFAULT_CONFIG_FILE);
    if implicit.is_file() {
        Ok((load_matrix_config(&implicit)?, Some(implicit)))
    } else {
        Ok((MatrixConfig::default(), None))
    }
}
