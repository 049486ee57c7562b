//! The resolved, navigable root of a task definition.

use serde::{Deserialize, Serialize};

use crate::core::async_action::AsyncActionConfiguration;
use crate::core::step::Step;
use crate::core::tree::find_step;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaInfo {
    pub identifier: String,
    pub revision: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_info: Option<SchemaInfo>,
    pub steps: Vec<Step>,
    /// Checkpoint identifiers for coarse progress; `None` means estimate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_markers: Option<Vec<String>>,
    /// Flattened async actions. Before resolution this only holds the ones
    /// declared on the task itself.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub async_actions: Vec<AsyncActionConfiguration>,
}

impl Task {
    pub fn new(identifier: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            identifier: identifier.into(),
            schema_info: None,
            steps,
            progress_markers: None,
            async_actions: Vec::new(),
        }
    }

    pub fn with_progress_markers(mut self, markers: Option<Vec<String>>) -> Self {
        self.progress_markers = markers;
        self
    }

    pub fn copy_with_steps(&self, steps: Vec<Step>) -> Self {
        Self {
            steps,
            ..self.clone()
        }
    }

    pub fn copy_with_async_actions(&self, async_actions: Vec<AsyncActionConfiguration>) -> Self {
        Self {
            async_actions,
            ..self.clone()
        }
    }

    pub fn async_action(&self, identifier: &str) -> Option<&AsyncActionConfiguration> {
        self.async_actions
            .iter()
            .find(|action| action.identifier == identifier)
    }

    /// Progress markers that name no step in `steps`.
    ///
    /// Markers refer to resolved identifiers, so a marker naming a nested
    /// step by its raw identifier shows up here.
    pub fn unknown_progress_markers(&self) -> Vec<&str> {
        self.progress_markers
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|marker| find_step(&self.steps, marker).is_none())
            .collect()
    }
}
