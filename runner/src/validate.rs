//! Load-and-check for a single task definition.

use anyhow::{Context, Result};

use crate::core::task::Task;
use crate::core::tree::{flatten, leaf_count};
use crate::io::config::RunnerConfig;
use crate::io::registry::StepRegistry;
use crate::io::task_store::TaskStore;

/// Summary of a task that loaded and resolved cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateOutcome {
    pub task: String,
    pub leaves: usize,
    pub sections: usize,
    pub async_actions: usize,
    /// Progress markers that name no step in the resolved tree.
    pub unknown_markers: Vec<String>,
}

/// Load, schema-check and resolve `identifier` under the configured root.
pub fn validate_task(
    config: &RunnerConfig,
    registry: &StepRegistry,
    identifier: &str,
) -> Result<ValidateOutcome> {
    let task = load_task(config, registry, identifier)?;
    Ok(summarize(&task))
}

/// Load and resolve `identifier`, attaching the task name to any failure.
pub fn load_task(config: &RunnerConfig, registry: &StepRegistry, identifier: &str) -> Result<Task> {
    TaskStore::new(config, registry)
        .load(identifier)
        .with_context(|| format!("load task '{identifier}'"))
}

fn summarize(task: &Task) -> ValidateOutcome {
    let unknown_markers = task
        .unknown_progress_markers()
        .into_iter()
        .map(str::to_string)
        .collect();
    ValidateOutcome {
        task: task.identifier.clone(),
        leaves: leaf_count(&task.steps),
        sections: flatten(&task.steps)
            .into_iter()
            .filter(|step| step.is_section())
            .count(),
        async_actions: task.async_actions.len(),
        unknown_markers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::LoadError;
    use crate::test_support::TempResources;
    use serde_json::json;

    fn config_for(temp: &TempResources) -> RunnerConfig {
        RunnerConfig {
            resource_root: temp.root().to_path_buf(),
            ..RunnerConfig::default()
        }
    }

    #[test]
    fn reports_counts_and_unknown_markers() {
        let temp = TempResources::new();
        temp.write_task(
            "survey",
            &json!({
                "identifier": "survey",
                "progressMarkers": ["intro", "ghost"],
                "steps": [
                    {"identifier": "intro", "type": "instruction"},
                    {"identifier": "block", "type": "section",
                     "asyncActions": [{"identifier": "gps", "type": "location"}],
                     "steps": [
                        {"identifier": "q1", "type": "form"},
                        {"identifier": "q2", "type": "form"}
                     ]}
                ]
            }),
        );
        let registry = StepRegistry::with_builtins();

        let outcome = validate_task(&config_for(&temp), &registry, "survey").expect("validate");
        assert_eq!(
            outcome,
            ValidateOutcome {
                task: "survey".to_string(),
                leaves: 3,
                sections: 1,
                async_actions: 1,
                unknown_markers: vec!["ghost".to_string()],
            }
        );
    }

    #[test]
    fn definition_errors_keep_their_type_under_context() {
        let temp = TempResources::new();
        temp.write_task(
            "broken",
            &json!({"identifier": "broken", "steps": [
                {"identifier": "t", "type": "transform",
                 "resourceTransformer": {"resourceName": "missing"}}
            ]}),
        );
        let registry = StepRegistry::with_builtins();

        let err = validate_task(&config_for(&temp), &registry, "broken").expect_err("missing");
        assert!(format!("{err:#}").starts_with("load task 'broken'"));
        assert!(matches!(
            err.downcast_ref::<LoadError>(),
            Some(LoadError::ResourceNotFound { .. })
        ));
    }
}
