//! Definition errors raised while loading and resolving a task.
//!
//! Every variant is fatal for the load that produced it: the loader never
//! hands out a partially resolved task.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    /// A section with no children was asked for its left-most or right-most leaf.
    #[error("section '{identifier}' has no child steps")]
    EmptySection { identifier: String },

    #[error("step identifier must not be empty (at {path})")]
    EmptyIdentifier { path: String },

    /// Two steps share an identifier, either among siblings or in the resolved tree.
    #[error("duplicate step identifier '{identifier}' (at {path})")]
    DuplicateIdentifier { identifier: String, path: String },

    #[error("duplicate async action identifier '{identifier}'")]
    DuplicateAsyncAction { identifier: String },

    #[error("resource '{name}' not found")]
    ResourceNotFound { name: String },

    #[error("resource '{name}' must contain a section step, found '{found}'")]
    TransformerNotSection { name: String, found: String },

    #[error("transformer cycle detected: {}", chain.join(" -> "))]
    TransformerCycle { chain: Vec<String> },

    #[error("unknown step type '{step_type}' for step '{identifier}'")]
    UnknownStepType {
        step_type: String,
        identifier: String,
    },

    #[error("missing or invalid field '{field}' in {context}")]
    MissingField { field: String, context: String },

    #[error("task definition failed schema validation: {0}")]
    Schema(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error at '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub fn missing_field(field: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            context: context.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_message_lists_chain_in_order() {
        let err = LoadError::TransformerCycle {
            chain: vec!["a".to_string(), "b".to_string(), "a".to_string()],
        };
        assert_eq!(err.to_string(), "transformer cycle detected: a -> b -> a");
    }

    #[test]
    fn io_message_includes_path() {
        let err = LoadError::io(
            "resources/task/missing.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("resources/task/missing.json"));
    }
}
