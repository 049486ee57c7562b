//! Per-step result values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The result recorded for one step (or one async action).
///
/// `identifier` matches the identifier of the step it represents. `end_time`
/// stays `None` while the result is still open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub identifier: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub kind: ResultKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ResultKind {
    Base,
    Answer(Answer),
    Collection(CollectionResult),
    File(FileResult),
    Error(ErrorResult),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    pub answer_type: AnswerType,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerType {
    Boolean,
    String,
    Integer,
    Decimal,
    Date,
    Codable,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionResult {
    #[serde(default)]
    pub input_results: Vec<StepResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResult {
    pub file_type: String,
    pub relative_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResult {
    pub error_description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}

/// Serializable stand-in for the error that produced an [`ErrorResult`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetail {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl ErrorDetail {
    /// Capture the message and source chain of `err`.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        Self {
            message: err.to_string(),
            causes,
        }
    }
}

impl StepResult {
    pub fn new(identifier: impl Into<String>, start_time: DateTime<Utc>, kind: ResultKind) -> Self {
        Self {
            identifier: identifier.into(),
            start_time,
            end_time: None,
            kind,
        }
    }

    pub fn base(identifier: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self::new(identifier, start_time, ResultKind::Base)
    }

    pub fn answer(
        identifier: impl Into<String>,
        start_time: DateTime<Utc>,
        answer_type: AnswerType,
        value: impl Into<Value>,
    ) -> Self {
        Self::new(
            identifier,
            start_time,
            ResultKind::Answer(Answer {
                answer_type,
                value: value.into(),
            }),
        )
    }

    pub fn collection(
        identifier: impl Into<String>,
        start_time: DateTime<Utc>,
        input_results: Vec<StepResult>,
    ) -> Self {
        Self::new(
            identifier,
            start_time,
            ResultKind::Collection(CollectionResult { input_results }),
        )
    }

    pub fn file(
        identifier: impl Into<String>,
        start_time: DateTime<Utc>,
        file_type: impl Into<String>,
        relative_path: impl Into<String>,
    ) -> Self {
        Self::new(
            identifier,
            start_time,
            ResultKind::File(FileResult {
                file_type: file_type.into(),
                relative_path: relative_path.into(),
            }),
        )
    }

    pub fn error(
        identifier: impl Into<String>,
        start_time: DateTime<Utc>,
        description: impl Into<String>,
        error: Option<ErrorDetail>,
    ) -> Self {
        Self::new(
            identifier,
            start_time,
            ResultKind::Error(ErrorResult {
                error_description: description.into(),
                error,
            }),
        )
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    pub fn with_end_time(mut self, end_time: DateTime<Utc>) -> Self {
        self.end_time = Some(end_time);
        self
    }

    pub fn as_answer(&self) -> Option<&Answer> {
        match &self.kind {
            ResultKind::Answer(answer) => Some(answer),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self.kind {
            ResultKind::Base => "base",
            ResultKind::Answer(_) => "answer",
            ResultKind::Collection(_) => "collection",
            ResultKind::File(_) => "file",
            ResultKind::Error(_) => "error",
        }
    }
}
