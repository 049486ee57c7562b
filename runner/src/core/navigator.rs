//! Forward/backward navigation and progress over a nested step tree.
//!
//! The navigator keeps no position of its own. Adjacency is positional over
//! the leaves of a pre-order walk, and progress is derived from the queried
//! step and the task result the caller passes in.

use std::collections::HashSet;

use serde::Serialize;
use tracing::warn;

use crate::core::step::Step;
use crate::core::task_result::TaskResult;
use crate::core::tree::{find_step, flatten, leaf_count, leaves, step_path};

/// Progress through a task, 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaskProgress {
    pub progress: usize,
    pub total: usize,
    /// True when derived from step counts rather than progress markers.
    pub estimated: bool,
}

#[derive(Debug, Clone, Copy)]
pub struct TreeNavigator<'a> {
    steps: &'a [Step],
    progress_markers: Option<&'a [String]>,
}

impl<'a> TreeNavigator<'a> {
    /// `progress_markers` of `None` selects estimated progress; an empty list
    /// means progress is not shown at all.
    pub fn new(steps: &'a [Step], progress_markers: Option<&'a [String]>) -> Self {
        Self {
            steps,
            progress_markers,
        }
    }

    pub fn steps(&self) -> &'a [Step] {
        self.steps
    }

    pub fn get_step(&self, identifier: &str) -> Option<&'a Step> {
        find_step(self.steps, identifier)
    }

    /// The leaf after `current`, or the first leaf when `current` is `None`.
    ///
    /// `_task_result` does not influence adjacency.
    pub fn get_next_step(
        &self,
        current: Option<&Step>,
        _task_result: &TaskResult,
    ) -> Option<&'a Step> {
        let Some(current) = current else {
            return leaves(self.steps).into_iter().next();
        };
        let flat = self.positions();
        let Some(idx) = position_of(&flat, &current.identifier) else {
            warn!(step = %current.identifier, "step not found in tree, no next step");
            return None;
        };
        flat[idx + 1..]
            .iter()
            .find(|step| step.is_leaf())
            .copied()
    }

    /// The leaf before `current` in the same ordering.
    pub fn get_previous_step(&self, current: &Step, _task_result: &TaskResult) -> Option<&'a Step> {
        let flat = self.positions();
        let Some(idx) = position_of(&flat, &current.identifier) else {
            warn!(step = %current.identifier, "step not found in tree, no previous step");
            return None;
        };
        flat[..idx].iter().rev().find(|step| step.is_leaf()).copied()
    }

    pub fn get_progress(&self, step: &Step, task_result: &TaskResult) -> Option<TaskProgress> {
        match self.progress_markers {
            Some(markers) => self.marker_progress(markers, step),
            None => Some(self.estimated_progress(step, task_result)),
        }
    }

    /// Progress is the 1-based index of the marker matching the step itself
    /// or its nearest enclosing section. Never finer than the marker list.
    fn marker_progress(&self, markers: &[String], step: &Step) -> Option<TaskProgress> {
        let index_of = |identifier: &str| markers.iter().position(|m| m == identifier);

        let idx = match index_of(&step.identifier) {
            Some(idx) => idx,
            None => step_path(self.steps, &step.identifier)?
                .iter()
                .rev()
                .skip(1)
                .find_map(|ancestor| index_of(&ancestor.identifier))?,
        };

        Some(TaskProgress {
            progress: idx + 1,
            total: markers.len(),
            estimated: false,
        })
    }

    fn estimated_progress(&self, step: &Step, task_result: &TaskResult) -> TaskProgress {
        let total = leaf_count(self.steps);
        let finished: HashSet<&str> = task_result
            .completed_identifiers()
            .filter(|identifier| *identifier != step.identifier)
            .collect();
        TaskProgress {
            progress: (finished.len() + 1).min(total.max(1)),
            total,
            estimated: true,
        }
    }

    fn positions(&self) -> Vec<&'a Step> {
        flatten(self.steps)
    }
}

fn position_of(flat: &[&Step], identifier: &str) -> Option<usize> {
    flat.iter().position(|step| step.identifier == identifier)
}
