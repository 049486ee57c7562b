//! Turn a raw, decoded task definition into a navigable [`Task`].

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::core::async_resolver::resolve_async_actions;
use crate::core::error::LoadError;
use crate::core::task::Task;
use crate::core::transformer::{ResourceLoader, resolve_steps};
use crate::core::tree::{leaf_count, validate_identifiers, validate_sibling_identifiers};

/// Resolve transformers, check identifiers and flatten async actions.
///
/// Task-level async actions keep their identifiers and windows and are placed
/// ahead of the step-level ones. Any failure aborts the whole load.
pub fn resolve_task(
    raw: &Task,
    loader: &dyn ResourceLoader,
    separator: &str,
) -> Result<Task, LoadError> {
    validate_sibling_identifiers(&raw.steps)?;
    let steps = resolve_steps(&raw.steps, separator, loader)?;
    validate_identifiers(&steps)?;

    let step_actions = resolve_async_actions(&steps, separator)?;
    let mut seen: HashSet<String> = HashSet::new();
    let mut async_actions = Vec::with_capacity(raw.async_actions.len() + step_actions.len());
    for action in raw.async_actions.iter().cloned().chain(step_actions) {
        if !seen.insert(action.identifier.clone()) {
            return Err(LoadError::DuplicateAsyncAction {
                identifier: action.identifier,
            });
        }
        async_actions.push(action);
    }

    debug!(
        task = %raw.identifier,
        top_level = steps.len(),
        leaves = leaf_count(&steps),
        "resolved step tree"
    );
    info!(
        task = %raw.identifier,
        async_actions = async_actions.len(),
        "task resolved"
    );
    let task = raw
        .copy_with_steps(steps)
        .copy_with_async_actions(async_actions);
    for marker in task.unknown_progress_markers() {
        warn!(task = %task.identifier, marker, "progress marker matches no resolved step");
    }
    Ok(task)
}
