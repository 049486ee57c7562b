//! Task definition loading: JSON, schema check, decode, resolve.

use jsonschema::validator_for;
use serde_json::Value;
use tracing::{debug, info};

use crate::core::error::LoadError;
use crate::core::loader::resolve_task;
use crate::core::task::{SchemaInfo, Task};
use crate::io::config::RunnerConfig;
use crate::io::registry::{StepRegistry, decode_async_actions};
use crate::io::resources::{DirectoryResources, read_json};

/// JSON Schema every task definition must satisfy before it is decoded.
pub const TASK_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/task/v1.schema.json"
));

/// Loads `task/<id>.json` from a resource directory.
pub struct TaskStore<'a> {
    resources: DirectoryResources<'a>,
    separator: String,
    validate_schema: bool,
}

impl<'a> TaskStore<'a> {
    pub fn new(config: &RunnerConfig, registry: &'a StepRegistry) -> Self {
        Self {
            resources: DirectoryResources::new(&config.resource_root, registry),
            separator: config.identifier_separator.clone(),
            validate_schema: config.validate_schema,
        }
    }

    pub fn resources(&self) -> &DirectoryResources<'a> {
        &self.resources
    }

    /// Decode the task without expanding transformers.
    pub fn load_raw(&self, identifier: &str) -> Result<Task, LoadError> {
        let path = self.resources.paths().task_path(identifier);
        debug!(task = %identifier, path = %path.display(), "loading task definition");
        let value = read_json(&path, identifier)?;
        if self.validate_schema {
            validate_task_schema(&value)?;
        }
        decode_task(self.resources.registry(), &value)
    }

    /// Load and fully resolve the task.
    pub fn load(&self, identifier: &str) -> Result<Task, LoadError> {
        let raw = self.load_raw(identifier)?;
        let task = resolve_task(&raw, &self.resources, &self.separator)?;
        info!(task = %task.identifier, steps = task.steps.len(), "task loaded");
        Ok(task)
    }
}

/// Decode the task object: `identifier`, `steps` and the optional
/// `schemaInfo`, `progressMarkers` and `asyncActions`.
pub fn decode_task(registry: &StepRegistry, value: &Value) -> Result<Task, LoadError> {
    let identifier = value
        .get("identifier")
        .and_then(Value::as_str)
        .ok_or_else(|| LoadError::missing_field("identifier", "task"))?;
    let context = format!("task '{identifier}'");
    let steps_value = value
        .get("steps")
        .ok_or_else(|| LoadError::missing_field("steps", &context))?;

    let mut task = Task::new(identifier, registry.decode_steps(steps_value, &context)?);
    task.schema_info = optional::<SchemaInfo>(value, "schemaInfo")?;
    task.progress_markers = optional::<Vec<String>>(value, "progressMarkers")?;
    if let Some(actions) = value.get("asyncActions").filter(|v| !v.is_null()) {
        task.async_actions = decode_async_actions(actions)?;
    }
    Ok(task)
}

fn optional<T: serde::de::DeserializeOwned>(
    value: &Value,
    field: &str,
) -> Result<Option<T>, LoadError> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(raw) => Ok(Some(serde_json::from_value(raw.clone())?)),
    }
}

/// Validate a raw task definition against [`TASK_SCHEMA`].
pub fn validate_task_schema(task: &Value) -> Result<(), LoadError> {
    let schema: Value = serde_json::from_str(TASK_SCHEMA)?;
    let compiled =
        validator_for(&schema).map_err(|err| LoadError::Schema(format!("invalid schema: {err}")))?;
    if !compiled.is_valid(task) {
        let messages = compiled
            .iter_errors(task)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(LoadError::Schema(messages.join("; ")));
    }
    Ok(())
}
