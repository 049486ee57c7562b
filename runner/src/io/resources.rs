//! Directory-backed task and transformer resources.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::core::error::LoadError;
use crate::core::step::Step;
use crate::core::transformer::ResourceLoader;
use crate::io::registry::StepRegistry;

/// Filesystem layout under the resource root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePaths {
    pub root: PathBuf,
    pub task_dir: PathBuf,
    pub transformer_dir: PathBuf,
}

impl ResourcePaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let task_dir = root.join("task");
        let transformer_dir = task_dir.join("transformer");
        Self {
            root,
            task_dir,
            transformer_dir,
        }
    }

    /// `task/<identifier>.json`
    pub fn task_path(&self, identifier: &str) -> PathBuf {
        self.task_dir.join(format!("{identifier}.json"))
    }

    /// `task/transformer/<name>`, or `<name>.json` when the bare name is absent.
    pub fn transformer_path(&self, name: &str) -> PathBuf {
        let bare = self.transformer_dir.join(name);
        if bare.is_file() || Path::new(name).extension().is_some() {
            return bare;
        }
        self.transformer_dir.join(format!("{name}.json"))
    }
}

/// Reads raw JSON resources from disk and decodes them with a [`StepRegistry`].
pub struct DirectoryResources<'a> {
    paths: ResourcePaths,
    registry: &'a StepRegistry,
}

impl<'a> DirectoryResources<'a> {
    pub fn new(root: impl Into<PathBuf>, registry: &'a StepRegistry) -> Self {
        Self {
            paths: ResourcePaths::new(root),
            registry,
        }
    }

    pub fn paths(&self) -> &ResourcePaths {
        &self.paths
    }

    pub fn registry(&self) -> &StepRegistry {
        self.registry
    }
}

impl ResourceLoader for DirectoryResources<'_> {
    fn load_section(&self, name: &str) -> Result<Step, LoadError> {
        let path = self.paths.transformer_path(name);
        debug!(resource = %name, path = %path.display(), "loading transformer resource");
        let value = read_json(&path, name)?;
        self.registry.decode_step(&value)
    }
}

/// Read and parse one JSON resource. A missing file is `ResourceNotFound`.
pub fn read_json(path: &Path, name: &str) -> Result<Value, LoadError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(LoadError::ResourceNotFound {
                name: name.to_string(),
            });
        }
        Err(err) => return Err(LoadError::io(path, err)),
    };
    Ok(serde_json::from_str(&contents)?)
}
