//! # Data Models Module / 数据模型模块
//!
//! This module defines the data structures shared by the planner, the runner
//! and the reporters: the option pairs that make up the build matrix, the
//! outcome of every external step, and the per-iteration records.
//!
//! 此模块定义了规划器、运行器和报告器共享的数据结构：
//! 构成构建矩阵的选项对、每个外部步骤的结果以及每次迭代的记录。

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::infra::t;

/// CMake cache variable toggling the bundled SHA-256 implementation.
pub const CUSTOM_SHA256_FLAG: &str = "COUNTLY_USE_CUSTOM_SHA256";
/// CMake cache variable toggling the SQLite storage backend.
pub const USE_SQLITE_FLAG: &str = "COUNTLY_USE_SQLITE";
/// CMake cache variable enabling the sample target. Always on.
pub const BUILD_SAMPLE_FLAG: &str = "COUNTLY_BUILD_SAMPLE";
/// CMake cache variable enabling the tests target. Always on.
pub const BUILD_TESTS_FLAG: &str = "COUNTLY_BUILD_TESTS";

/// One configuration point in the 2×2 build matrix.
/// 2×2 构建矩阵中的一个配置点。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OptionPair {
    /// Whether the custom SHA-256 implementation is compiled in / 是否编译自定义 SHA-256 实现
    pub custom_sha256: bool,
    /// Whether the SQLite storage backend is compiled in / 是否编译 SQLite 存储后端
    pub use_sqlite: bool,
}

impl OptionPair {
    pub const fn new(custom_sha256: bool, use_sqlite: bool) -> Self {
        Self {
            custom_sha256,
            use_sqlite,
        }
    }

    /// Returns the full matrix in its fixed order: `(0,0), (0,1), (1,0), (1,1)`.
    ///
    /// 以固定顺序返回完整矩阵：`(0,0), (0,1), (1,0), (1,1)`。
    pub const fn all() -> [OptionPair; 4] {
        [
            OptionPair::new(false, false),
            OptionPair::new(false, true),
            OptionPair::new(true, false),
            OptionPair::new(true, true),
        ]
    }

    /// A stable, filesystem- and CLI-friendly name, e.g. `sha256-on_sqlite-off`.
    pub fn case_name(&self) -> String {
        format!(
            "sha256-{}_sqlite-{}",
            on_off(self.custom_sha256),
            on_off(self.use_sqlite)
        )
    }

    /// Parses a name produced by [`OptionPair::case_name`].
    pub fn from_case_name(name: &str) -> Option<Self> {
        Self::all().into_iter().find(|pair| pair.case_name() == name)
    }

    /// The `-D` cache definitions for this pair, in the order the configure
    /// step passes them.
    ///
    /// 此选项对的 `-D` 缓存定义，按配置步骤传递的顺序排列。
    pub fn definitions(&self) -> Vec<(&'static str, u8)> {
        vec![
            (BUILD_SAMPLE_FLAG, 1),
            (BUILD_TESTS_FLAG, 1),
            (CUSTOM_SHA256_FLAG, u8::from(self.custom_sha256)),
            (USE_SQLITE_FLAG, u8::from(self.use_sqlite)),
        ]
    }
}

impl fmt::Display for OptionPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}={} and {}={}",
            CUSTOM_SHA256_FLAG,
            u8::from(self.custom_sha256),
            USE_SQLITE_FLAG,
            u8::from(self.use_sqlite)
        )
    }
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

/// The external steps of one iteration, in execution order.
/// 一次迭代中的外部步骤，按执行顺序排列。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    /// Recursive removal of the build directory / 递归删除构建目录
    Clean,
    /// Build-file generation / 生成构建文件
    Configure,
    /// Compilation of the sample executable / 编译示例可执行文件
    BuildSample,
    /// Compilation of the test executable / 编译测试可执行文件
    BuildTests,
    /// Execution of the test executable / 执行测试可执行文件
    RunTests,
}

impl StepKind {
    pub fn label(&self) -> String {
        match self {
            StepKind::Clean => t!("step.clean").to_string(),
            StepKind::Configure => t!("step.configure").to_string(),
            StepKind::BuildSample => t!("step.build_sample").to_string(),
            StepKind::BuildTests => t!("step.build_tests").to_string(),
            StepKind::RunTests => t!("step.run_tests").to_string(),
        }
    }
}

/// How a single external step ended.
///
/// 单个外部步骤的结束方式。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    /// The process exited with status zero, or the filesystem action succeeded.
    Succeeded,
    /// The process exited with a non-zero status. `None` means it was killed by a signal.
    Failed { code: Option<i32> },
    /// The process could not be started at all.
    NotStarted { error: String },
    /// The process exceeded the configured timeout and was killed.
    TimedOut { after: Duration },
    /// A filesystem step failed.
    Io { error: String },
}

impl StepStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, StepStatus::Succeeded)
    }

    /// Short, human-readable description used by the log and the reports.
    pub fn describe(&self) -> String {
        match self {
            StepStatus::Succeeded => "ok".to_string(),
            StepStatus::Failed { code: Some(code) } => format!("exit code {code}"),
            StepStatus::Failed { code: None } => "terminated by signal".to_string(),
            StepStatus::NotStarted { error } => format!("not started: {error}"),
            StepStatus::TimedOut { after } => format!("timed out after {}s", after.as_secs()),
            StepStatus::Io { error } => error.clone(),
        }
    }
}

/// The record of one external step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    pub kind: StepKind,
    /// The command line as it was executed, empty for filesystem-only steps.
    /// 实际执行的命令行，对于仅涉及文件系统的步骤为空。
    pub command: String,
    pub status: StepStatus,
    pub duration: Duration,
}

/// Everything one iteration of the matrix produced.
///
/// 矩阵一次迭代产生的全部内容。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IterationRecord {
    pub pair: OptionPair,
    pub started_at: DateTime<Local>,
    pub steps: Vec<StepRecord>,
    /// Combined stdout/stderr of the test executable as read back from the output file.
    /// 从输出文件中读回的测试可执行文件的合并 stdout/stderr。
    pub test_output: String,
    /// Target binaries found in the build directory after compilation.
    pub artifacts: Vec<String>,
    pub duration: Duration,
}

impl IterationRecord {
    pub fn step(&self, kind: StepKind) -> Option<&StepRecord> {
        self.steps.iter().find(|s| s.kind == kind)
    }

    /// `true` if every recorded step succeeded.
    pub fn all_steps_succeeded(&self) -> bool {
        self.steps.iter().all(|s| s.status.is_success())
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &StepRecord> {
        self.steps.iter().filter(|s| !s.status.is_success())
    }
}

/// The outcome of a whole matrix run.
/// 整个矩阵运行的结果。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunSummary {
    pub strict: bool,
    pub iterations: Vec<IterationRecord>,
    /// Pairs that were planned but never started because the run stopped early.
    /// 已计划但因运行提前停止而从未开始的选项对。
    pub not_run: Vec<OptionPair>,
    /// `true` if the run was stopped by a shutdown signal.
    pub interrupted: bool,
}

impl RunSummary {
    /// Number of iterations in which at least one step did not succeed.
    pub fn iterations_with_failures(&self) -> usize {
        self.iterations
            .iter()
            .filter(|it| !it.all_steps_succeeded())
            .count()
    }
}
