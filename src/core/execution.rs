//! # Matrix Execution Engine Module / 矩阵执行引擎模块
//!
//! Runs the build matrix one option pair at a time: clean the build
//! directory, configure, compile the sample and the tests, run the tests with
//! their output captured to a file, log that output and remove the file.
//!
//! All paths are derived from the project root fixed at construction; the
//! process working directory is never changed. Every external step reports
//! its exit status. Whether a failing step stops the run is decided by
//! `MatrixConfig::strict`.
//!
//! 逐个选项对运行构建矩阵：清理构建目录、配置、编译示例和测试、
//! 运行测试并将输出捕获到文件、记录该输出并删除文件。
//! 所有路径都从构造时确定的项目根目录派生，从不改变进程工作目录。

use anyhow::{bail, Context, Result};
use chrono::Local;
use colored::*;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::core::config::MatrixConfig;
use crate::core::models::{
    IterationRecord, OptionPair, RunSummary, StepKind, StepRecord, StepStatus,
};
use crate::infra::command::{self, CommandLine, CommandOutcome, Interrupted};
use crate::infra::fs::{self as project_fs, ProjectRoot};
use crate::infra::logger::{LogLevel, RunLog};
use crate::infra::t;

/// Label that precedes the captured test output in the log.
pub const DOCTEST_RESULTS_LABEL: &str = "Doctest results:";
/// Last log record of every completed iteration.
pub const ITERATION_FINISHED: &str = "Script finished.";

/// Drives the matrix for one project.
/// 为一个项目驱动构建矩阵。
#[derive(Debug)]
pub struct MatrixRunner {
    config: MatrixConfig,
    root: ProjectRoot,
    configure_tool: CommandLine,
    build_tool: CommandLine,
    token: CancellationToken,
    /// Logical working directory: `true` once an iteration has entered the
    /// build directory, or when the tool was started inside it.
    /// 逻辑工作目录：迭代进入构建目录后，或工具在构建目录中启动时为 `true`。
    in_build_dir: AtomicBool,
}

impl MatrixRunner {
    /// Creates a runner for an already-normalized project root.
    ///
    /// # Arguments
    /// * `config` - A validated configuration
    /// * `root` - The project root, see [`project_fs::resolve_project_root`]
    /// * `token` - Cancelling it stops the run at the next step boundary and
    ///   kills a running child
    pub fn new(config: MatrixConfig, root: ProjectRoot, token: CancellationToken) -> Result<Self> {
        let configure_tool = CommandLine::parse(&config.tools.configure)?;
        let build_tool = CommandLine::parse(&config.tools.build)?;
        let in_build_dir = AtomicBool::new(root.left_build_dir);
        Ok(Self {
            config,
            root,
            configure_tool,
            build_tool,
            token,
            in_build_dir,
        })
    }

    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    pub fn project_root(&self) -> &ProjectRoot {
        &self.root
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.path.join(&self.config.build_dir)
    }

    pub fn output_file(&self) -> PathBuf {
        self.build_dir().join(&self.config.test_run.output_file)
    }

    pub fn log_file(&self) -> PathBuf {
        self.root.path.join(&self.config.log_file)
    }

    /// The generator invocation for `pair`:
    /// `<configure> -DCOUNTLY_BUILD_SAMPLE=1 -DCOUNTLY_BUILD_TESTS=1
    /// -DCOUNTLY_USE_CUSTOM_SHA256=<a> -DCOUNTLY_USE_SQLITE=<b> [extra] -B <build> .`
    ///
    /// 为 `pair` 生成的构建文件生成器调用。
    pub fn configure_command(&self, pair: OptionPair) -> CommandLine {
        self.configure_tool
            .clone()
            .args(
                pair.definitions()
                    .into_iter()
                    .map(|(name, value)| format!("-D{name}={value}")),
            )
            .args(self.config.tools.configure_args.iter().cloned())
            .arg("-B")
            .arg(self.config.build_dir.clone())
            .arg(".")
    }

    pub fn build_command(&self, target: &str) -> CommandLine {
        self.build_tool.clone().arg(target)
    }

    /// The test executable inside the build directory.
    pub fn test_command(&self) -> CommandLine {
        let executable = self
            .build_dir()
            .join(executable_name(&self.config.targets.tests));
        CommandLine::new(executable.to_string_lossy())
    }

    /// Runs every pair in order and returns what happened.
    ///
    /// An interruption stops the run and is reported through
    /// [`RunSummary::interrupted`]. Any other error (a strict-mode step
    /// failure, a fault on the captured-output file, an unwritable log) ends
    /// the run and is returned; the log keeps what was written so far.
    ///
    /// 按顺序运行每个选项对并返回结果。中断会停止运行并通过
    /// [`RunSummary::interrupted`] 报告；其他错误会结束运行并返回，
    /// 日志保留已写入的内容。
    pub async fn run(&self, pairs: &[OptionPair], log: &mut RunLog) -> Result<RunSummary> {
        let mut summary = RunSummary {
            strict: self.config.strict,
            ..RunSummary::default()
        };

        for (i, pair) in pairs.iter().enumerate() {
            if self.token.is_cancelled() {
                self.record_interruption(log, &mut summary, &pairs[i..])?;
                break;
            }

            match self.run_iteration(*pair, log).await {
                Ok(record) => summary.iterations.push(record),
                Err(e) if e.is::<Interrupted>() => {
                    self.record_interruption(log, &mut summary, &pairs[i..])?;
                    break;
                }
                Err(e) => {
                    // Best effort; the original error matters more than a failed log write.
                    let _ = log.error(&format!("{e:#}"));
                    return Err(e);
                }
            }
        }

        Ok(summary)
    }

    fn record_interruption(
        &self,
        log: &mut RunLog,
        summary: &mut RunSummary,
        remaining: &[OptionPair],
    ) -> Result<()> {
        summary.interrupted = true;
        summary.not_run.extend_from_slice(remaining);
        println!("\n{}", t!("run.interrupted").yellow());
        write_log(log, LogLevel::Warning, "Run interrupted.")
    }

    /// Runs one option pair start to finish.
    ///
    /// 完整运行一个选项对。
    pub async fn run_iteration(&self, pair: OptionPair, log: &mut RunLog) -> Result<IterationRecord> {
        let started_at = Local::now();
        let iteration_start = Instant::now();
        let mut steps = Vec::with_capacity(5);

        println!("{}", t!("run.iteration_start", pair = pair).bold());
        write_log(log, LogLevel::Info, &format!("Running script with {pair}"))?;

        let root_display = self.root.path.display().to_string();
        if self.in_build_dir.load(Ordering::Relaxed) {
            println!("{}", t!("run.in_build_folder"));
            write_log(log, LogLevel::Info, "In build folder. Changing directory...")?;
            println!("{}", t!("run.current_directory", path = &root_display));
            write_log(log, LogLevel::Info, &format!("Current directory: {root_display}"))?;
        } else {
            println!("{}", t!("run.not_in_build_folder", path = &root_display));
            write_log(
                log,
                LogLevel::Info,
                &format!("Not in build folder. Current directory: {root_display}"),
            )?;
        }

        // Clean
        let build_dir = self.build_dir();
        println!("{}", t!("run.deleting_build_dir").blue());
        write_log(log, LogLevel::Info, "Deleting folder and its subfolders...")?;
        let clean_start = Instant::now();
        let clean_status = match project_fs::clean_dir(&build_dir) {
            Ok(()) => StepStatus::Succeeded,
            Err(e) => StepStatus::Io {
                error: format!("{e:#}"),
            },
        };
        let clean = StepRecord {
            kind: StepKind::Clean,
            command: String::new(),
            status: clean_status,
            duration: clean_start.elapsed(),
        };
        self.check_step(&clean, log)?;
        steps.push(clean);
        println!("{}", t!("run.build_dir_deleted").blue());
        write_log(log, LogLevel::Info, "Folder and subfolders deleted.")?;

        // Configure
        let configure = self.configure_command(pair);
        let outcome = self.run_tool(&configure, &self.root.path, log).await?;
        let record = step_record(StepKind::Configure, &configure, outcome);
        self.check_step(&record, log)?;
        steps.push(record);
        write_log(log, LogLevel::Info, "Ran cmake to generate makefiles.")?;

        // Enter the build directory
        if !project_fs::is_directory(&build_dir) {
            bail!("{}", t!("run.build_dir_missing", path = build_dir.display()));
        }
        self.in_build_dir.store(true, Ordering::Relaxed);
        let build_display = build_dir.display().to_string();
        println!("{}", t!("run.current_directory", path = &build_display));
        write_log(log, LogLevel::Info, &format!("Current directory: {build_display}"))?;

        // Compile
        for (kind, target) in [
            (StepKind::BuildSample, self.config.targets.sample.as_str()),
            (StepKind::BuildTests, self.config.targets.tests.as_str()),
        ] {
            let build = self.build_command(target);
            let outcome = self.run_tool(&build, &build_dir, log).await?;
            let record = step_record(kind, &build, outcome);
            self.check_step(&record, log)?;
            steps.push(record);
        }

        let expected = [
            executable_name(&self.config.targets.sample),
            executable_name(&self.config.targets.tests),
        ];
        let artifacts = project_fs::existing_files(
            &build_dir,
            &[expected[0].as_str(), expected[1].as_str()],
        );
        for target in &expected {
            if !artifacts.contains(target) {
                write_log(
                    log,
                    LogLevel::Warning,
                    &format!("Expected artifact {target} not found in {build_display}"),
                )?;
            }
        }

        // Run tests
        let output_file = self.output_file();
        let test = self.test_command();
        println!("{}", t!("run.running_tests", command = test.display()).blue());
        write_log(log, LogLevel::Debug, &format!("Running {}", test.display()))?;
        let outcome = command::run_to_file(
            &test,
            &build_dir,
            &output_file,
            self.config.test_run.timeout(),
            &self.token,
        )
        .await?;
        let record = step_record(StepKind::RunTests, &test, outcome);

        // Logged and removed even when the step fails in strict mode.
        let test_output = project_fs::read_output_file(&output_file)?;
        write_log(
            log,
            LogLevel::Info,
            &format!("{DOCTEST_RESULTS_LABEL}\n{test_output}"),
        )?;
        project_fs::remove_output_file(&output_file)?;
        write_log(log, LogLevel::Info, "Removed doctest output file.")?;

        self.check_step(&record, log)?;
        steps.push(record);

        println!("{}", t!("run.done").green());
        write_log(log, LogLevel::Info, ITERATION_FINISHED)?;

        Ok(IterationRecord {
            pair,
            started_at,
            steps,
            test_output,
            artifacts,
            duration: iteration_start.elapsed(),
        })
    }

    /// Runs a tool with its output captured, echoes that output to the console
    /// and records it in the log at debug level.
    async fn run_tool(
        &self,
        line: &CommandLine,
        cwd: &std::path::Path,
        log: &mut RunLog,
    ) -> Result<CommandOutcome> {
        println!("{} {}", t!("run.command_prefix").blue(), line.display());
        write_log(log, LogLevel::Debug, &format!("Running {}", line.display()))?;

        let outcome = command::spawn_and_capture(line.to_command(cwd), None, &self.token).await?;

        let trimmed = outcome.output.trim_end();
        if !trimmed.is_empty() {
            println!("{}", trimmed.dimmed());
            write_log(log, LogLevel::Debug, trimmed)?;
        }
        Ok(outcome)
    }

    /// Records a failed step and, in strict mode, turns it into an error.
    ///
    /// 记录失败的步骤；在严格模式下将其转换为错误。
    fn check_step(&self, step: &StepRecord, log: &mut RunLog) -> Result<()> {
        if step.status.is_success() {
            return Ok(());
        }

        let label = step.kind.label();
        let status = step.status.describe();
        println!(
            "{}",
            t!("run.step_failed", step = &label, status = &status).yellow()
        );
        let command = if step.command.is_empty() {
            String::new()
        } else {
            format!(" ({})", step.command)
        };
        write_log(
            log,
            LogLevel::Warning,
            &format!("Step {:?} failed: {status}{command}", step.kind),
        )?;

        if self.config.strict {
            bail!("{}", t!("run.strict_abort", step = &label, status = &status));
        }
        Ok(())
    }
}

/// File name of a built target on this platform.
pub fn executable_name(target: &str) -> String {
    format!("{target}{}", std::env::consts::EXE_SUFFIX)
}

fn step_record(kind: StepKind, line: &CommandLine, outcome: CommandOutcome) -> StepRecord {
    StepRecord {
        kind,
        command: line.display(),
        status: outcome.status,
        duration: outcome.duration,
    }
}

fn write_log(log: &mut RunLog, level: LogLevel, message: &str) -> Result<()> {
    log.log(level, message)
        .with_context(|| t!("log.write_failed").to_string())
}

/// Total wall time of all recorded iterations.
pub fn total_duration(summary: &RunSummary) -> Duration {
    summary.iterations.iter().map(|it| it.duration).sum()
}
