//! # Core Module / 核心模块
//!
//! This module contains the core functionality of the build matrix runner,
//! including data models, configuration, planning and the execution engine.
//!
//! 此模块包含构建矩阵运行器的核心功能，
//! 包括数据模型、配置、执行计划和执行引擎。

pub mod config;
pub mod execution;
pub mod models;
pub mod planner;

// Re-exports
pub use config::MatrixConfig;
pub use execution::MatrixRunner;
pub use models::{IterationRecord, OptionPair, RunSummary};
