//! # Execution Planner Module / 执行计划模块
//!
//! Decides which option pairs of the matrix this invocation runs: an optional
//! selection by case name, then an optional round-robin split across CI
//! runners. The fixed matrix order is always preserved.
//!
//! 决定本次调用运行矩阵中的哪些选项对：可选的按用例名称筛选，
//! 然后可选的在 CI 运行器之间轮询分配。始终保持固定的矩阵顺序。

use anyhow::{bail, Result};

use crate::core::models::OptionPair;
use crate::infra::t;

/// Represents the execution plan for one invocation.
/// 表示一次调用的执行计划。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionPlan {
    /// The option pairs to run, in matrix order.
    /// 要运行的选项对，按矩阵顺序排列。
    pub pairs_to_run: Vec<OptionPair>,
    /// The number of pairs excluded by the case-name selection.
    /// 被用例名称筛选排除的选项对数量。
    pub filtered_count: usize,
    /// Whether the pairs are distributed across multiple runners (CI environment).
    /// 选项对是否分布在多个运行器上（CI 环境）。
    pub is_distributed: bool,
}

/// Creates an execution plan.
///
/// # Arguments
/// * `selected` - Case names to keep (see [`OptionPair::case_name`]); empty keeps all
/// * `total_runners` - Optional total number of runners for distributed execution
/// * `runner_index` - Optional index of this runner (0-based)
///
/// # Returns
/// An `ExecutionPlan`, or an error for unknown case names or inconsistent runner arguments
pub fn plan_execution(
    selected: &[String],
    total_runners: Option<usize>,
    runner_index: Option<usize>,
) -> Result<ExecutionPlan> {
    for name in selected {
        if OptionPair::from_case_name(name).is_none() {
            let known: Vec<String> = OptionPair::all().iter().map(|p| p.case_name()).collect();
            bail!(
                "{}",
                t!("plan.unknown_case", name = name, known = known.join(", "))
            );
        }
    }

    let (kept, filtered): (Vec<_>, Vec<_>) = OptionPair::all()
        .into_iter()
        .partition(|pair| selected.is_empty() || selected.contains(&pair.case_name()));

    let (pairs_to_run, is_distributed) = match (total_runners, runner_index) {
        (Some(total), Some(index)) => {
            if total == 0 || index >= total {
                bail!("{}", t!("plan.runner_index_out_of_range"));
            }
            let distributed = kept
                .into_iter()
                .enumerate()
                .filter(|(i, _)| i % total == index)
                .map(|(_, pair)| pair)
                .collect();
            (distributed, true)
        }
        (None, None) => (kept, false),
        _ => bail!("{}", t!("plan.runner_args_incomplete")),
    };

    Ok(ExecutionPlan {
        pairs_to_run,
        filtered_count: filtered.len(),
        is_distributed,
    })
}
