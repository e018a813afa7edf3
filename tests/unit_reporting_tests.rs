//! # Reporting Module Unit Tests / Reporting 模块单元测试
//!
//! Tests for the HTML and JSON report files.
//!
//! 测试 HTML 和 JSON 报告文件。

use build_matrix::models::{
    IterationRecord, OptionPair, RunSummary, StepKind, StepRecord, StepStatus,
};
use build_matrix::reporting::html::render_html_report;
use build_matrix::reporting::{generate_html_report, write_json_report};
use chrono::Local;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

fn sample_summary() -> RunSummary {
    let steps = vec![
        StepRecord {
            kind: StepKind::Configure,
            command: "cmake -DCOUNTLY_USE_CUSTOM_SHA256=1 -B build .".to_string(),
            status: StepStatus::Succeeded,
            duration: Duration::from_millis(800),
        },
        StepRecord {
            kind: StepKind::RunTests,
            command: "/work/build/countly-tests".to_string(),
            status: StepStatus::Failed { code: Some(1) },
            duration: Duration::from_millis(300),
        },
    ];
    RunSummary {
        strict: false,
        iterations: vec![IterationRecord {
            pair: OptionPair::new(true, false),
            started_at: Local::now(),
            steps,
            test_output: "[doctest] test cases: 2 | 1 passed | 1 failed <sqlite>".to_string(),
            artifacts: vec!["countly-tests".to_string()],
            duration: Duration::from_secs(2),
        }],
        not_run: vec![OptionPair::new(true, true)],
        interrupted: true,
    }
}

#[test]
fn test_html_contains_cases_and_escaped_output() {
    build_matrix::init(Some("en"));
    let html = render_html_report(&sample_summary()).into_string();

    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("sha256-on_sqlite-off"));
    assert!(html.contains("sha256-on_sqlite-on"));
    assert!(html.contains("exit code 1"));
    assert!(html.contains("&lt;sqlite&gt;"));
    assert!(!html.contains("<sqlite>"));
}

#[test]
fn test_html_report_is_written() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.html");
    generate_html_report(&sample_summary(), &path).unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("status-failed"));
}

#[test]
fn test_json_report_keeps_step_details() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("report.json");
    write_json_report(&sample_summary(), &path).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["interrupted"], true);
    assert_eq!(value["iterations"][0]["pair"]["custom_sha256"], true);
    assert_eq!(value["iterations"][0]["pair"]["use_sqlite"], false);
    assert_eq!(
        value["iterations"][0]["steps"][1]["status"]["Failed"]["code"],
        1
    );
    assert_eq!(value["not_run"][0]["use_sqlite"], true);
}
