//! # JSON Reporting Module / JSON 报告模块
//!
//! Dumps the run summary as pretty-printed JSON for CI tooling.
//!
//! 将运行摘要以格式化 JSON 输出，供 CI 工具使用。

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::core::models::RunSummary;
use crate::infra::t;

pub fn write_json_report(summary: &RunSummary, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary).context(t!("report.serialize_failed").to_string())?;
    fs::write(output_path, json)
        .with_context(|| t!("report.write_failed", path = output_path.display()).to_string())
}
