//! Background actions attached to steps or to the task itself.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Async action types that record data and therefore carry a stop bound.
pub const RECORDER_TYPES: &[&str] = &["motion", "distance", "microphone", "location"];

/// Configuration for an action that runs in the background while the
/// participant moves through a window of steps.
///
/// Both bounds are inclusive. An absent start means "start with the task", an
/// absent stop means "stop with the task".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsyncActionConfiguration {
    pub identifier: String,
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_step_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_step_identifier: Option<String>,
    /// Recorder specific settings (`frequency`, `recorderTypes`, ...).
    #[serde(flatten)]
    pub parameters: Map<String, Value>,
}

impl AsyncActionConfiguration {
    pub fn new(identifier: impl Into<String>, action_type: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            action_type: action_type.into(),
            start_step_identifier: None,
            stop_step_identifier: None,
            parameters: Map::new(),
        }
    }

    pub fn is_recorder(&self) -> bool {
        RECORDER_TYPES.contains(&self.action_type.as_str())
    }

    pub fn copy_with_identifier(&self, identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..self.clone()
        }
    }

    pub fn copy_with_start_step_identifier(&self, start: Option<String>) -> Self {
        Self {
            start_step_identifier: start,
            ..self.clone()
        }
    }

    pub fn copy_with_stop_step_identifier(&self, stop: Option<String>) -> Self {
        Self {
            stop_step_identifier: stop,
            ..self.clone()
        }
    }
}
