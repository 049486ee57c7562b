//! Task result persistence.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::core::task_result::TaskResult;

/// Load a task result written by [`write_task_result`].
pub fn load_task_result(path: &Path) -> Result<TaskResult> {
    debug!(path = %path.display(), "loading task result");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read task result {}", path.display()))?;
    let result: TaskResult = serde_json::from_str(&contents)
        .with_context(|| format!("parse task result {}", path.display()))?;
    debug!(task = %result.identifier, run = %result.task_run_uuid, "task result loaded");
    Ok(result)
}

/// Atomically write a task result as pretty JSON (temp file + rename).
pub fn write_task_result(path: &Path, result: &TaskResult) -> Result<()> {
    debug!(
        path = %path.display(),
        task = %result.identifier,
        steps = result.step_history().len(),
        "writing task result"
    );
    let mut buf = serde_json::to_string_pretty(result).context("serialize task result")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("task result path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp task result {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("replace task result {}", path.display()))?;
    Ok(())
}
