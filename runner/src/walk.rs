//! Walk a task from first to last step without a participant.
//!
//! Every step is completed with an empty base result. Useful for checking
//! navigation, progress and async windows of a definition end to end.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::debug;

use crate::core::result::StepResult;
use crate::core::task::Task;
use crate::core::task_result::TaskResult;
use crate::io::result_store::write_task_result;
use crate::run::TaskRun;

#[derive(Debug, Clone, PartialEq)]
pub struct WalkOutcome {
    /// Leaf identifiers in the order they were visited.
    pub visited: Vec<String>,
    pub task_result: TaskResult,
}

/// Drive `task` forward to the end, writing one line per event to `out`.
///
/// Lines are `[progress/total] step` (or `[-] step` when the step has no
/// progress), plus `start <action>` / `stop <action>` for async windows.
pub fn walk_task(task: Task, out: &mut impl Write) -> Result<WalkOutcome> {
    let mut run = TaskRun::new(task, Utc::now());
    let mut visited = Vec::new();

    for action in run.initial_actions() {
        writeln!(out, "  start {action}").context("write walk output")?;
    }

    while let Some(step) = run.current_step() {
        let identifier = step.identifier.clone();
        let label = match run.progress() {
            Some(progress) => format!("[{}/{}]", progress.progress, progress.total),
            None => "[-]".to_string(),
        };
        writeln!(out, "{label} {identifier}").context("write walk output")?;

        let now = Utc::now();
        let result = StepResult::base(identifier.clone(), now).with_end_time(now);
        let transition = run
            .go_forward(result, now)
            .with_context(|| format!("complete step '{identifier}'"))?;
        for action in &transition.stop {
            writeln!(out, "  stop {action}").context("write walk output")?;
        }
        for action in &transition.start {
            writeln!(out, "  start {action}").context("write walk output")?;
        }
        visited.push(identifier);
    }

    debug!(steps = visited.len(), "walk finished");
    Ok(WalkOutcome {
        visited,
        task_result: run.into_task_result(),
    })
}

/// Walk `task` and optionally persist the final result to `output`.
pub fn walk_and_record(
    task: Task,
    output: Option<&Path>,
    out: &mut impl Write,
) -> Result<WalkOutcome> {
    let outcome = walk_task(task, out)?;
    if let Some(path) = output {
        write_task_result(path, &outcome.task_result)
            .with_context(|| format!("record task result to {}", path.display()))?;
    }
    Ok(outcome)
}
