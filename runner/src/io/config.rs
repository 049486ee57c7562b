//! Runner configuration stored in `task-runner.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

/// Runner configuration (TOML).
///
/// Missing fields fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunnerConfig {
    /// Directory holding `task/<id>.json` and `task/transformer/<name>`.
    pub resource_root: PathBuf,

    /// Joins a parent identifier to a child when namespacing.
    pub identifier_separator: String,

    /// Tracing filter used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Check task definitions against the bundled JSON Schema before decoding.
    pub validate_schema: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            resource_root: PathBuf::from("resources"),
            identifier_separator: ".".to_string(),
            log_filter: "warn".to_string(),
            validate_schema: true,
        }
    }
}

impl RunnerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.resource_root.as_os_str().is_empty() {
            return Err(anyhow!("resource_root must not be empty"));
        }
        if self.identifier_separator.is_empty() {
            return Err(anyhow!("identifier_separator must not be empty"));
        }
        if self.log_filter.trim().is_empty() {
            return Err(anyhow!("log_filter must not be empty"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `RunnerConfig::default()`.
pub fn load_config(path: &Path) -> Result<RunnerConfig> {
    if !path.exists() {
        let cfg = RunnerConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: RunnerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, RunnerConfig::default());
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("task-runner.toml");
        fs::write(&path, "identifier_separator = \"/\"\nvalidate_schema = false\n").expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.identifier_separator, "/");
        assert!(!cfg.validate_schema);
        assert_eq!(cfg.resource_root, PathBuf::from("resources"));
        assert_eq!(cfg.log_filter, "warn");
    }

    #[test]
    fn empty_separator_is_rejected() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("task-runner.toml");
        fs::write(&path, "identifier_separator = \"\"\n").expect("write");

        let err = load_config(&path).expect_err("invalid");
        assert!(format!("{err:#}").contains("identifier_separator must not be empty"));
    }

    #[test]
    fn malformed_toml_reports_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("task-runner.toml");
        fs::write(&path, "resource_root = [").expect("write");

        let err = load_config(&path).expect_err("parse");
        assert!(err.to_string().contains("parse"));
    }
}
