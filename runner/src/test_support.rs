//! Test-only helpers for building step trees, results and resource folders.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use tempfile::TempDir;

use crate::core::error::LoadError;
use crate::core::result::StepResult;
use crate::core::step::Step;
use crate::core::task_result::TaskResult;
use crate::core::transformer::ResourceLoader;
use crate::core::tree::leaves;

/// Fixed clock used by every helper.
pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
        .single()
        .expect("valid fixed time")
}

/// Create a `base` step.
pub fn leaf(id: &str) -> Step {
    Step::base(id)
}

pub fn section(id: &str, steps: Vec<Step>) -> Step {
    Step::section(id, steps)
}

pub fn transformer(id: &str, resource_name: &str) -> Step {
    Step::transformer(id, resource_name)
}

pub fn base_result(id: &str) -> StepResult {
    StepResult::base(id, fixed_time())
}

/// Task result whose step history holds base results for `ids`, in order.
pub fn task_result_with(ids: &[&str]) -> TaskResult {
    ids.iter()
        .fold(TaskResult::new("task", fixed_time()), |acc, id| {
            acc.add_step_history(base_result(id))
        })
}

/// Identifiers of the leaves below `step`, in pre-order.
pub fn leaves_of(step: &Step) -> Vec<String> {
    leaves(std::slice::from_ref(step))
        .into_iter()
        .map(|leaf| leaf.identifier.clone())
        .collect()
}

/// Nine top-level steps; `step4`, `step5` and `step6` are sections of three.
pub fn navigator_fixture_steps() -> Vec<Step> {
    let sub = |parent: &str, names: [&str; 3]| {
        section(
            parent,
            names
                .iter()
                .map(|name| leaf(&format!("{parent}.{name}")))
                .collect(),
        )
    };
    vec![
        leaf("introduction"),
        leaf("step1"),
        leaf("step2"),
        leaf("step3"),
        sub("step4", ["A", "B", "C"]),
        sub("step5", ["X", "Y", "Z"]),
        sub("step6", ["A", "B", "C"]),
        leaf("step7"),
        leaf("completion"),
    ]
}

/// `step1` through `step7`.
pub fn navigator_fixture_markers() -> Vec<String> {
    (1..=7).map(|n| format!("step{n}")).collect()
}

/// In-memory [`ResourceLoader`] keyed by resource name.
#[derive(Debug, Default, Clone)]
pub struct InMemoryResources {
    sections: HashMap<String, Step>,
}

impl InMemoryResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, step: Step) -> Self {
        self.sections.insert(name.to_string(), step);
        self
    }
}

impl ResourceLoader for InMemoryResources {
    fn load_section(&self, name: &str) -> Result<Step, LoadError> {
        self.sections
            .get(name)
            .cloned()
            .ok_or_else(|| LoadError::ResourceNotFound {
                name: name.to_string(),
            })
    }
}

/// Temporary resource root laid out as `task/` and `task/transformer/`.
pub struct TempResources {
    dir: TempDir,
}

impl Default for TempResources {
    fn default() -> Self {
        Self::new()
    }
}

impl TempResources {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("task").join("transformer")).expect("create layout");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `task/<id>.json`.
    pub fn write_task(&self, id: &str, value: &Value) {
        self.write_raw(&format!("task/{id}.json"), &pretty(value));
    }

    /// Write `task/transformer/<file_name>` (extension included by the caller).
    pub fn write_transformer(&self, file_name: &str, value: &Value) {
        self.write_raw(&format!("task/transformer/{file_name}"), &pretty(value));
    }

    pub fn write_raw(&self, relative: &str, contents: &str) {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent");
        }
        fs::write(&path, contents).expect("write resource");
    }

    /// Copy every file under `source` into the resource root.
    pub fn copy_tree(&self, source: &Path) {
        copy_dir(source, self.dir.path());
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).expect("serialize json")
}

fn copy_dir(source: &Path, target: &Path) {
    fs::create_dir_all(target).expect("create target");
    for entry in fs::read_dir(source).expect("read dir") {
        let entry = entry.expect("dir entry");
        let destination = target.join(entry.file_name());
        if entry.file_type().expect("file type").is_dir() {
            copy_dir(&entry.path(), &destination);
        } else {
            fs::copy(entry.path(), &destination).expect("copy file");
        }
    }
}
