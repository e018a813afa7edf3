//! # HTML Reporting Module / HTML 报告模块
//!
//! Renders a self-contained HTML page for a matrix run: one section per
//! option pair with its step table and the captured test output.
//!
//! 为矩阵运行渲染一个独立的 HTML 页面：每个选项对一个部分，
//! 包含步骤表和捕获的测试输出。

use anyhow::{Context, Result};
use maud::{html, Markup, PreEscaped, DOCTYPE};
use std::fs;
use std::path::Path;

use crate::core::execution::total_duration;
use crate::core::models::{IterationRecord, RunSummary, StepStatus};
use crate::infra::t;

const HTML_STYLE: &str = r#"
body { font-family: -apple-system, "Segoe UI", Helvetica, Arial, sans-serif; margin: 2em; color: #24292f; }
h1 { border-bottom: 1px solid #d0d7de; padding-bottom: .3em; }
table { border-collapse: collapse; margin: 1em 0; }
th, td { border: 1px solid #d0d7de; padding: 4px 10px; text-align: left; }
th { background: #f6f8fa; }
.status-ok { color: #1a7f37; font-weight: 600; }
.status-failed { color: #cf222e; font-weight: 600; }
.stats span { margin-right: 2em; }
pre { background: #f6f8fa; padding: 1em; overflow-x: auto; max-height: 30em; }
"#;

/// Renders the report markup.
///
/// 渲染报告标记。
pub fn render_html_report(summary: &RunSummary) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { (t!("html_report.title").to_string()) }
                style { (PreEscaped(HTML_STYLE)) }
            }
            body {
                h1 { (t!("html_report.main_header").to_string()) }
                div class="stats" {
                    span { (t!("html_report.runs").to_string()) ": " (summary.iterations.len()) }
                    span { (t!("html_report.with_failures").to_string()) ": " (summary.iterations_with_failures()) }
                    span { (t!("html_report.not_run").to_string()) ": " (summary.not_run.len()) }
                    span { (t!("html_report.total_duration").to_string()) ": " (format!("{:.2?}", total_duration(summary))) }
                    span { (t!("html_report.mode").to_string()) ": " (if summary.strict { "strict" } else { "best effort" }) }
                }
                @for iteration in &summary.iterations {
                    (render_iteration(iteration))
                }
                @if !summary.not_run.is_empty() {
                    h2 { (t!("html_report.not_run").to_string()) }
                    ul {
                        @for pair in &summary.not_run {
                            li { code { (pair.case_name()) } }
                        }
                    }
                }
            }
        }
    }
}

fn render_iteration(iteration: &IterationRecord) -> Markup {
    html! {
        section {
            h2 { (iteration.pair.case_name()) }
            p {
                code { (iteration.pair.to_string()) }
                " · " (iteration.started_at.format("%Y-%m-%d %H:%M:%S").to_string())
                " · " (format!("{:.2?}", iteration.duration))
            }
            table {
                thead {
                    tr {
                        th { (t!("html_report.step").to_string()) }
                        th { (t!("html_report.command").to_string()) }
                        th { (t!("html_report.status").to_string()) }
                        th { (t!("html_report.duration").to_string()) }
                    }
                }
                tbody {
                    @for step in &iteration.steps {
                        tr {
                            td { (step.kind.label()) }
                            td { code { (step.command) } }
                            td class=(status_class(&step.status)) { (step.status.describe()) }
                            td { (format!("{:.2?}", step.duration)) }
                        }
                    }
                }
            }
            h3 { (t!("html_report.test_output").to_string()) }
            pre { (iteration.test_output) }
        }
    }
}

fn status_class(status: &StepStatus) -> &'static str {
    if status.is_success() {
        "status-ok"
    } else {
        "status-failed"
    }
}

/// Writes the HTML report to `output_path`.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub fn generate_html_report(summary: &RunSummary, output_path: &Path) -> Result<()> {
    let markup = render_html_report(summary);
    fs::write(output_path, markup.into_string())
        .with_context(|| t!("report.write_failed", path = output_path.display()).to_string())
}
