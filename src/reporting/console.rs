//! # Console Reporting Module / 控制台报告模块
//!
//! Prints the end-of-run summary table with colored step statuses.
//!
//! 打印带有彩色步骤状态的运行结束摘要表。

use colored::*;

use crate::core::execution::total_duration;
use crate::core::models::{IterationRecord, RunSummary, StepKind, StepStatus};
use crate::infra::t;

const STEP_COLUMNS: [StepKind; 5] = [
    StepKind::Clean,
    StepKind::Configure,
    StepKind::BuildSample,
    StepKind::BuildTests,
    StepKind::RunTests,
];

/// Prints a formatted summary of a matrix run to the console.
///
/// 在控制台打印矩阵运行的格式化摘要。
///
/// # Output Format / 输出格式
/// ```text
/// --- Build Matrix Summary ---
///   - Case                       | clean  configure sample tests  run    | Duration
///   - sha256-off_sqlite-off      | ok     ok        ok     ok     FAIL   |   12.31s
///   - sha256-off_sqlite-on       | ok     ok        ok     ok     ok     |   11.02s
///   - sha256-on_sqlite-off       | not run
/// ```
pub fn print_summary(summary: &RunSummary) {
    println!("\n{}", t!("summary.banner").bold());
    println!(
        "  - {:<26} | {} | {:>10}",
        t!("summary.case"),
        STEP_COLUMNS
            .iter()
            .map(|kind| format!("{:<9}", short_label(*kind)))
            .collect::<Vec<_>>()
            .join(" "),
        t!("summary.duration")
    );

    for iteration in &summary.iterations {
        print_iteration_row(iteration);
    }
    for pair in &summary.not_run {
        println!(
            "  - {:<26} | {}",
            pair.case_name(),
            t!("summary.not_run").dimmed()
        );
    }

    let with_failures = summary.iterations_with_failures();
    let totals = t!(
        "summary.totals",
        runs = summary.iterations.len(),
        failures = with_failures,
        duration = format!("{:.2?}", total_duration(summary))
    );
    if with_failures > 0 {
        println!("\n{}", totals.yellow());
        if !summary.strict {
            println!("{}", t!("summary.failures_ignored").dimmed());
        }
    } else {
        println!("\n{}", totals.green());
    }
}

fn print_iteration_row(iteration: &IterationRecord) {
    let cells: Vec<String> = STEP_COLUMNS
        .iter()
        .map(|kind| {
            let cell = match iteration.step(*kind).map(|s| &s.status) {
                Some(StepStatus::Succeeded) => format!("{:<9}", "ok").green(),
                Some(StepStatus::TimedOut { .. }) => format!("{:<9}", "TIMEOUT").red(),
                Some(_) => format!("{:<9}", "FAIL").red(),
                None => format!("{:<9}", "-").dimmed(),
            };
            cell.to_string()
        })
        .collect();

    println!(
        "  - {:<26} | {} | {:>10}",
        iteration.pair.case_name(),
        cells.join(" "),
        format!("{:.2?}", iteration.duration)
    );
}

fn short_label(kind: StepKind) -> &'static str {
    match kind {
        StepKind::Clean => "clean",
        StepKind::Configure => "configure",
        StepKind::BuildSample => "sample",
        StepKind::BuildTests => "tests",
        StepKind::RunTests => "run",
    }
}
