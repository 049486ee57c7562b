//! Drive a resolved task step by step.
//!
//! [`TaskRun`] owns the only mutable reference to the current [`TaskResult`].
//! Every operation reads the latest value, builds a new one and swaps it in,
//! so the last assignment wins.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::async_action::AsyncActionConfiguration;
use crate::core::navigator::{TaskProgress, TreeNavigator};
use crate::core::result::StepResult;
use crate::core::step::Step;
use crate::core::task::Task;
use crate::core::task_result::TaskResult;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RunError {
    #[error("task run is already finished")]
    Finished,

    #[error("result '{found}' does not belong to the current step '{expected}'")]
    ResultMismatch { expected: String, found: String },
}

/// What changed when the run moved between steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepTransition {
    pub from: Option<String>,
    pub to: Option<String>,
    /// Async action identifiers whose window opens here.
    pub start: Vec<String>,
    /// Async action identifiers whose window closes here.
    pub stop: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TaskRun {
    task: Task,
    task_result: TaskResult,
    current: Option<String>,
}

impl TaskRun {
    /// Start a run positioned on the first leaf of `task`.
    pub fn new(task: Task, start_time: DateTime<Utc>) -> Self {
        let task_result = TaskResult::new(task.identifier.clone(), start_time)
            .with_schema_info(task.schema_info.clone());
        Self::with_result(task, task_result)
    }

    /// Start a run that records into an existing (usually empty) result.
    pub fn with_result(task: Task, task_result: TaskResult) -> Self {
        let first = TreeNavigator::new(&task.steps, task.progress_markers.as_deref())
            .get_next_step(None, &task_result)
            .map(|step| step.identifier.clone());
        let task_result = match &first {
            Some(_) => task_result,
            None => task_result.finished(task_result.start_time),
        };
        info!(
            task = %task.identifier,
            run = %task_result.task_run_uuid,
            first = ?first,
            "task run started"
        );
        Self {
            task,
            task_result,
            current: first,
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn task_result(&self) -> &TaskResult {
        &self.task_result
    }

    pub fn into_task_result(self) -> TaskResult {
        self.task_result
    }

    pub fn navigator(&self) -> TreeNavigator<'_> {
        TreeNavigator::new(&self.task.steps, self.task.progress_markers.as_deref())
    }

    pub fn current_step(&self) -> Option<&Step> {
        let identifier = self.current.as_deref()?;
        self.navigator().get_step(identifier)
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none()
    }

    pub fn progress(&self) -> Option<TaskProgress> {
        let step = self.current_step()?;
        self.navigator().get_progress(step, &self.task_result)
    }

    /// Async actions to start before the first step is shown: those starting
    /// with the task plus those bound to the first step.
    pub fn initial_actions(&self) -> Vec<String> {
        let Some(first) = self.current.as_deref() else {
            return Vec::new();
        };
        self.action_ids(|action| {
            action
                .start_step_identifier
                .as_deref()
                .is_none_or(|start| start == first)
        })
    }

    /// Record `result` for the current step and move to the next one.
    ///
    /// When there is no next step the task result is closed at `now`.
    pub fn go_forward(
        &mut self,
        result: StepResult,
        now: DateTime<Utc>,
    ) -> Result<StepTransition, RunError> {
        let current = self.current.clone().ok_or(RunError::Finished)?;
        if result.identifier != current {
            return Err(RunError::ResultMismatch {
                expected: current,
                found: result.identifier,
            });
        }

        let updated = self.task_result.add_step_history(result);
        let next = self
            .navigator()
            .get_step(&current)
            .and_then(|step| self.navigator().get_next_step(Some(step), &updated))
            .map(|step| step.identifier.clone());

        let mut stop =
            self.action_ids(|action| action.stop_step_identifier.as_deref() == Some(&*current));
        let start = match next.as_deref() {
            Some(next) => {
                self.action_ids(|action| action.start_step_identifier.as_deref() == Some(next))
            }
            None => {
                stop.extend(self.action_ids(|action| action.stop_step_identifier.is_none()));
                Vec::new()
            }
        };

        self.task_result = match next {
            Some(_) => updated,
            None => updated.finished(now),
        };
        debug!(from = %current, to = ?next, start = ?start, stop = ?stop, "moved forward");
        if next.is_none() {
            info!(task = %self.task.identifier, "task run finished");
        }
        self.current = next.clone();

        Ok(StepTransition {
            from: Some(current),
            to: next,
            start,
            stop,
        })
    }

    /// Move to the previous step, discarding its result and everything after.
    ///
    /// Returns `None` on the first step or once finished. Windows are
    /// unwound: actions that started on the step being left stop, and actions
    /// that stopped on the step being re-entered start again.
    pub fn go_back(&mut self) -> Option<StepTransition> {
        let current = self.current.clone()?;
        let previous = {
            let navigator = self.navigator();
            let step = navigator.get_step(&current)?;
            navigator
                .get_previous_step(step, &self.task_result)?
                .identifier
                .clone()
        };

        let stop =
            self.action_ids(|action| action.start_step_identifier.as_deref() == Some(&*current));
        let start =
            self.action_ids(|action| action.stop_step_identifier.as_deref() == Some(&*previous));

        self.task_result = self.task_result.remove_step_history(&previous);
        debug!(from = %current, to = %previous, "moved back");
        self.current = Some(previous.clone());

        Some(StepTransition {
            from: Some(current),
            to: Some(previous),
            start,
            stop,
        })
    }

    /// Merge a recorder's output into the task result.
    pub fn add_async_result(&mut self, result: StepResult) {
        debug!(action = %result.identifier, "async result added");
        self.task_result = self.task_result.add_async_result(result);
    }

    fn action_ids(&self, filter: impl Fn(&AsyncActionConfiguration) -> bool) -> Vec<String> {
        self.task
            .async_actions
            .iter()
            .filter(|action| filter(action))
            .map(|action| action.identifier.clone())
            .collect()
    }
}
