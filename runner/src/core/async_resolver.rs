//! Flatten per-step async action declarations into one resolved set.

use std::collections::HashSet;

use tracing::debug;

use crate::core::async_action::AsyncActionConfiguration;
use crate::core::error::LoadError;
use crate::core::step::Step;
use crate::core::tree::{left_most_leaf, right_most_leaf};

/// Resolve every async action declared anywhere in `steps`.
///
/// Missing start bounds default to the declaring step (or, for a section, its
/// left-most leaf). Recorder actions also get a default stop bound: the
/// right-most leaf of a declaring section. Identifiers are rewritten to
/// `<step><separator><action>` so they stay unique once flattened.
pub fn resolve_async_actions(
    steps: &[Step],
    separator: &str,
) -> Result<Vec<AsyncActionConfiguration>, LoadError> {
    let mut resolved = Vec::new();
    let mut seen = HashSet::new();
    for step in steps {
        collect(step, separator, &mut resolved, &mut seen)?;
    }
    Ok(resolved)
}

fn collect(
    step: &Step,
    separator: &str,
    resolved: &mut Vec<AsyncActionConfiguration>,
    seen: &mut HashSet<String>,
) -> Result<(), LoadError> {
    let (default_start, default_stop) = match step.children() {
        Some(_) => (
            left_most_leaf(step)?.identifier.clone(),
            Some(right_most_leaf(step)?.identifier.clone()),
        ),
        None => (step.identifier.clone(), None),
    };

    if let Some(children) = step.children() {
        for child in children {
            collect(child, separator, resolved, seen)?;
        }
    }

    for action in &step.async_actions {
        let mut config = action
            .copy_with_identifier(format!("{}{}{}", step.identifier, separator, action.identifier));
        if config.start_step_identifier.is_none() {
            config = config.copy_with_start_step_identifier(Some(default_start.clone()));
        }
        if config.is_recorder() && config.stop_step_identifier.is_none() {
            config = config.copy_with_stop_step_identifier(default_stop.clone());
        }

        if !seen.insert(config.identifier.clone()) {
            return Err(LoadError::DuplicateAsyncAction {
                identifier: config.identifier,
            });
        }
        debug!(
            action = %config.identifier,
            start = ?config.start_step_identifier,
            stop = ?config.stop_step_identifier,
            "resolved async action"
        );
        resolved.push(config);
    }
    Ok(())
}
