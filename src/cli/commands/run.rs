//! # Run Command Module / 运行命令模块
//!
//! This module implements the `run` command, which walks the build matrix
//! according to the configuration and writes the run log.
//!
//! 此模块实现了 `run` 命令，根据配置遍历构建矩阵并写入运行日志。

use anyhow::{bail, Result};
use colored::*;
use std::path::{Path, PathBuf};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    core::{
        config,
        execution::MatrixRunner,
        planner,
    },
    infra::{fs as project_fs, logger::RunLog, t},
    reporting::{generate_html_report, print_summary, write_json_report},
};

/// Arguments of the `run` command.
/// `run` 命令的参数。
#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    /// Explicit configuration file / 显式指定的配置文件
    pub config: Option<PathBuf>,
    /// Directory the tool is pointed at; a `build` directory is replaced by its parent.
    /// 工具指向的目录；`build` 目录会被替换为其父目录。
    pub project_dir: PathBuf,
    /// Forces strict mode on, regardless of the configuration.
    pub strict: bool,
    /// Case names to run; empty runs the whole matrix.
    pub cases: Vec<String>,
    pub total_runners: Option<usize>,
    pub runner_index: Option<usize>,
    pub html: Option<PathBuf>,
    pub json: Option<PathBuf>,
    /// Language given on the command line, which takes precedence over the configuration.
    pub lang: Option<String>,
}

/// Executes the run command with the provided arguments.
///
/// # Arguments
/// * `args` - Parsed command-line arguments
///
/// # Returns
/// A Result indicating success or failure of the command execution.
/// Failing external steps only fail the command in strict mode.
pub async fn execute(args: RunArgs) -> Result<()> {
    let root = project_fs::resolve_project_root(&args.project_dir)?;
    let (mut matrix_config, config_path) =
        config::resolve_config(args.config.as_deref(), &root.path)?;

    if args.lang.is_none() {
        if let Some(language) = &matrix_config.language {
            crate::init(Some(language.as_str()));
        }
    }
    if args.strict {
        matrix_config.strict = true;
    }

    println!(
        "{}",
        t!("run.project_root_detected", path = root.path.display())
    );
    match &config_path {
        Some(path) => println!("{}", t!("run.loading_config", path = path.display())),
        None => println!("{}", t!("run.using_default_config")),
    }
    if matrix_config.strict {
        println!("{}", t!("run.strict_mode").cyan());
    }

    let plan = planner::plan_execution(&args.cases, args.total_runners, args.runner_index)?;

    if plan.filtered_count > 0 {
        println!(
            "{}",
            t!(
                "run.filtered_cases",
                filtered = plan.filtered_count,
                total = plan.pairs_to_run.len()
            )
            .cyan()
        );
    }
    if let (Some(total), Some(index)) = (args.total_runners, args.runner_index) {
        println!(
            "{}",
            t!(
                "run.running_as_split_runner",
                index = index + 1,
                total = total,
                count = plan.pairs_to_run.len()
            )
            .bold()
        );
    }

    if plan.pairs_to_run.is_empty() {
        println!("{}", t!("run.no_cases_to_run").green());
        return Ok(());
    }

    let stop_token = setup_signal_handler();
    let runner = MatrixRunner::new(matrix_config, root, stop_token)?;
    let mut log = RunLog::open(&runner.log_file(), runner.config().log_level)?;
    println!("{}", t!("run.log_file", path = runner.log_file().display()));

    let summary = runner.run(&plan.pairs_to_run, &mut log).await?;

    print_summary(&summary);

    if let Some(report_path) = &args.html {
        write_report(report_path, "HTML", || generate_html_report(&summary, report_path));
    }
    if let Some(report_path) = &args.json {
        write_report(report_path, "JSON", || write_json_report(&summary, report_path));
    }

    if summary.interrupted {
        bail!("{}", t!("run.interrupted"));
    }

    println!("\n{}", t!("run.matrix_finished").green().bold());
    Ok(())
}

/// Report failures are printed, never propagated.
fn write_report(path: &Path, kind: &str, generate: impl FnOnce() -> Result<()>) {
    println!(
        "\n{}",
        t!("report.generating", kind = kind, path = path.display())
    );
    if let Err(e) = generate() {
        eprintln!("{} {:#}", t!("report.failed", kind = kind).red(), e);
    }
}

/// Sets up a signal handler for graceful shutdown.
fn setup_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            println!("\n{}", t!("run.shutdown_signal").yellow());
            token_clone.cancel();
        }
    });

    token
}
