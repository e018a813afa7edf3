//! # Run Log Module / 运行日志模块
//!
//! The run log is a flat, append-only text file with one record per entry:
//! `<timestamp>:<LEVEL>:<message>`, where the timestamp follows the
//! `YYYY-MM-DD HH:MM:SS,mmm` layout. Multi-line messages (captured test
//! output) are written verbatim after the prefix.
//!
//! A `RunLog` is constructed once at start-up and handed to the runner; there
//! is no global logger.
//!
//! 运行日志是一个扁平的、仅追加的文本文件，每条记录格式为
//! `<时间戳>:<级别>:<消息>`。`RunLog` 在启动时构造一次并传递给运行器，
//! 不存在全局日志器。

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::infra::t;

/// Timestamp layout of every record.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Severity of a log record, ordered from least to most severe.
/// 日志记录的严重级别，从低到高排序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    #[serde(alias = "warn")]
    Warning,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An explicitly owned log sink.
///
/// 显式持有的日志输出端。
pub struct RunLog {
    sink: Box<dyn Write + Send>,
    min_level: LogLevel,
    path: Option<PathBuf>,
}

impl RunLog {
    /// Opens (or creates) `path` in append mode.
    ///
    /// # Arguments
    /// * `path` - The log file path
    /// * `min_level` - Records below this level are dropped
    pub fn open(path: &Path, min_level: LogLevel) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| t!("log.open_failed", path = path.display()).to_string())?;
        Ok(Self {
            sink: Box::new(file),
            min_level,
            path: Some(path.to_path_buf()),
        })
    }

    /// Wraps an arbitrary writer. Used when the log should not touch the filesystem.
    /// 包装任意写入器。用于日志不应触及文件系统的场景。
    pub fn from_writer<W: Write + Send + 'static>(writer: W, min_level: LogLevel) -> Self {
        Self {
            sink: Box::new(writer),
            min_level,
            path: None,
        }
    }

    /// The file backing this log, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    /// Appends one record if `level` passes the filter. The record is flushed
    /// immediately so a run that terminates early still leaves a partial log.
    ///
    /// 若 `level` 通过过滤则追加一条记录。记录会立即刷新，
    /// 因此提前终止的运行仍会留下部分日志。
    pub fn log(&mut self, level: LogLevel, message: &str) -> io::Result<()> {
        if level < self.min_level {
            return Ok(());
        }
        let line = format_record(&Local::now().format(TIMESTAMP_FORMAT).to_string(), level, message);
        self.sink.write_all(line.as_bytes())?;
        self.sink.flush()
    }

    pub fn debug(&mut self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&mut self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Info, message)
    }

    pub fn warning(&mut self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Warning, message)
    }

    pub fn error(&mut self, message: &str) -> io::Result<()> {
        self.log(LogLevel::Error, message)
    }
}

impl fmt::Debug for RunLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunLog")
            .field("path", &self.path)
            .field("min_level", &self.min_level)
            .finish_non_exhaustive()
    }
}

/// Renders one record, including the trailing newline.
pub fn format_record(timestamp: &str, level: LogLevel, message: &str) -> String {
    format!("{timestamp}:{level}:{message}\n")
}
