//! # Reporting Module / 报告模块
//!
//! This module renders the outcome of a matrix run: a colored summary table
//! on the console, and optional HTML and JSON report files.
//!
//! 此模块呈现矩阵运行的结果：控制台上的彩色摘要表，
//! 以及可选的 HTML 和 JSON 报告文件。

pub mod console;
pub mod html;
pub mod json;

// Re-export common reporting functions
pub use console::print_summary;
pub use html::generate_html_report;
pub use json::write_json_report;
