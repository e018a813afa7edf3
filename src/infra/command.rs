//! # Command Execution Module / 命令执行模块
//!
//! Child-process plumbing for the runner: parsing configured command lines,
//! running a tool while capturing its output, and running the test binary
//! with its combined output redirected into a file. Every call reports the
//! exit status; deciding what a failure means is left to the caller.
//!
//! 运行器的子进程管道：解析配置的命令行、运行工具并捕获其输出、
//! 以及将测试二进制的合并输出重定向到文件中运行。每次调用都会报告退出状态，
//! 失败的含义由调用方决定。

use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Child;
use tokio_util::sync::CancellationToken;

use crate::core::models::StepStatus;
use crate::infra::t;

/// Returned (wrapped in `anyhow::Error`) when the run's cancellation token fires
/// while a child process is alive. The child is killed before this is returned.
///
/// 当子进程存活期间运行的取消令牌被触发时返回（包装在 `anyhow::Error` 中）。
/// 返回前子进程已被终止。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interrupted;

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&t!("run.interrupted"))
    }
}

impl std::error::Error for Interrupted {}

/// A program plus its arguments, ready to be spawned.
/// 程序及其参数，可直接派生执行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    program: String,
    args: Vec<String>,
}

impl CommandLine {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Parses a configured command line such as `"cmake"` or `"sh ~/bin/fake-make.sh"`.
    /// Environment variables and `~` are expanded first, then the string is split
    /// using shell quoting rules.
    ///
    /// 解析配置的命令行。先展开环境变量和 `~`，再按 shell 引号规则拆分。
    pub fn parse(line: &str) -> Result<Self> {
        let expanded = shellexpand::full(line)
            .with_context(|| t!("command.expand_failed", command = line).to_string())?
            .to_string();

        let mut parts = shlex::split(&expanded)
            .ok_or_else(|| anyhow!("{}", t!("command.parse_failed", command = &expanded)))?
            .into_iter();

        let program = parts
            .next()
            .ok_or_else(|| anyhow!("{}", t!("command.empty", command = line)))?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Renders the command line with shell quoting, for logs and reports.
    pub fn display(&self) -> String {
        let parts = std::iter::once(self.program.as_str()).chain(self.args.iter().map(String::as_str));
        shlex::try_join(parts.clone()).unwrap_or_else(|_| parts.collect::<Vec<_>>().join(" "))
    }

    /// Builds a `tokio` command running in `cwd`. The child is killed if the
    /// handle is dropped, and never inherits stdin.
    pub fn to_command(&self, cwd: &Path) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(cwd)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

/// The observable result of one child process.
/// 单个子进程的可观察结果。
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub status: StepStatus,
    /// Combined stdout and stderr when captured, empty when redirected to a file.
    /// 捕获时为合并的 stdout 和 stderr，重定向到文件时为空。
    pub output: String,
    pub duration: Duration,
}

enum WaitOutcome {
    Exited(std::io::Result<ExitStatus>),
    TimedOut(Duration),
    Cancelled,
}

/// Waits for `child`, giving up when `timeout` elapses or `token` is cancelled.
/// In both of those cases the child is killed before returning.
async fn wait_with_limits(
    child: &mut Child,
    timeout: Option<Duration>,
    token: &CancellationToken,
) -> WaitOutcome {
    let outcome = {
        let wait = async {
            match timeout {
                Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                    Ok(status) => WaitOutcome::Exited(status),
                    Err(_) => WaitOutcome::TimedOut(limit),
                },
                None => WaitOutcome::Exited(child.wait().await),
            }
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => WaitOutcome::Cancelled,
            outcome = wait => outcome,
        }
    };

    if !matches!(outcome, WaitOutcome::Exited(_)) {
        // Already-exited children make `kill` fail; nothing left to do then.
        let _ = child.kill().await;
    }
    outcome
}

fn status_from_exit(status: std::io::Result<ExitStatus>) -> StepStatus {
    match status {
        Ok(status) if status.success() => StepStatus::Succeeded,
        Ok(status) => StepStatus::Failed {
            code: status.code(),
        },
        Err(e) => StepStatus::NotStarted {
            error: e.to_string(),
        },
    }
}

/// Spawns a command and captures its stdout and stderr.
/// The output streams are read concurrently and combined into a single string.
///
/// # Arguments
/// * `cmd` - The `tokio::process::Command` to execute.
/// * `timeout` - Optional limit after which the child is killed.
/// * `token` - Cancels the wait and kills the child.
///
/// # Returns
/// The `CommandOutcome`, or an [`Interrupted`] error if `token` fired.
///
/// 派生一个命令，捕获其 stdout 和 stderr。
/// 输出流被并发读取并合并到一个字符串中。
pub async fn spawn_and_capture(
    mut cmd: tokio::process::Command,
    timeout: Option<Duration>,
    token: &CancellationToken,
) -> Result<CommandOutcome> {
    let start_time = Instant::now();

    let mut child = match cmd
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
    {
        Ok(child) => child,
        Err(e) => {
            return Ok(CommandOutcome {
                status: StepStatus::NotStarted {
                    error: e.to_string(),
                },
                output: String::new(),
                duration: start_time.elapsed(),
            });
        }
    };

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("{}", t!("command.capture_stdout_failed")))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("{}", t!("command.capture_stderr_failed")))?;

    // Both reader tasks append into the same buffer.
    // 两个读取任务都追加到同一个缓冲区。
    let output = Arc::new(tokio::sync::Mutex::new(String::new()));

    let stdout_output = Arc::clone(&output);
    let stdout_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stdout_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let stderr_output = Arc::clone(&output);
    let stderr_handle = tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let mut output = stderr_output.lock().await;
            output.push_str(&line);
            output.push('\n');
        }
    });

    let outcome = wait_with_limits(&mut child, timeout, token).await;

    // Wait for the readers so that all output is captured.
    // 等待读取任务完成，以确保所有输出都被捕获。
    if let Err(e) = stdout_handle.await {
        eprintln!("{}", t!("command.join_reader_failed", error = e));
    }
    if let Err(e) = stderr_handle.await {
        eprintln!("{}", t!("command.join_reader_failed", error = e));
    }

    let status = match outcome {
        WaitOutcome::Exited(status) => status_from_exit(status),
        WaitOutcome::TimedOut(after) => StepStatus::TimedOut { after },
        WaitOutcome::Cancelled => return Err(Interrupted.into()),
    };

    let output = output.lock().await.clone();
    Ok(CommandOutcome {
        status,
        output,
        duration: start_time.elapsed(),
    })
}

/// Runs a command with stdout and stderr both redirected into `output_path`,
/// which is truncated or created first.
///
/// Failing to create the file is an error. A program that cannot be started
/// leaves its diagnostic in the file, the way a shell redirection would.
///
/// 运行命令并将 stdout 和 stderr 都重定向到 `output_path`（先截断或创建）。
/// 无法创建文件会返回错误。无法启动的程序会把诊断信息留在文件中，
/// 与 shell 重定向的行为一致。
pub async fn run_to_file(
    line: &CommandLine,
    cwd: &Path,
    output_path: &Path,
    timeout: Option<Duration>,
    token: &CancellationToken,
) -> Result<CommandOutcome> {
    let file = File::create(output_path)
        .with_context(|| t!("command.output_file_failed", path = output_path.display()).to_string())?;
    let stderr_file = file
        .try_clone()
        .with_context(|| t!("command.output_file_failed", path = output_path.display()).to_string())?;

    let start_time = Instant::now();
    let mut cmd = line.to_command(cwd);
    cmd.stdout(Stdio::from(file)).stderr(Stdio::from(stderr_file));

    let spawned = cmd.spawn();
    // Release the parent's copies of the redirected handles.
    drop(cmd);

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            let diagnostic = format!("{}: {}\n", line.program(), e);
            std::fs::write(output_path, diagnostic).with_context(|| {
                t!("command.output_file_failed", path = output_path.display()).to_string()
            })?;
            return Ok(CommandOutcome {
                status: StepStatus::NotStarted {
                    error: e.to_string(),
                },
                output: String::new(),
                duration: start_time.elapsed(),
            });
        }
    };

    let status = match wait_with_limits(&mut child, timeout, token).await {
        WaitOutcome::Exited(status) => status_from_exit(status),
        WaitOutcome::TimedOut(after) => StepStatus::TimedOut { after },
        WaitOutcome::Cancelled => return Err(Interrupted.into()),
    };

    Ok(CommandOutcome {
        status,
        output: String::new(),
        duration: start_time.elapsed(),
    })
}
