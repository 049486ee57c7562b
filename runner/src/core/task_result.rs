//! The accumulating result of one run of a task.
//!
//! A [`TaskResult`] is a value: every mutation returns a new aggregate and
//! leaves the receiver untouched. Callers keep the latest version and swap it
//! in as a single assignment.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::result::StepResult;
use crate::core::step::Step;
use crate::core::task::SchemaInfo;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub identifier: String,
    pub task_run_uuid: Uuid,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_info: Option<SchemaInfo>,
    #[serde(default)]
    step_history: Vec<StepResult>,
    #[serde(default)]
    async_results: Vec<StepResult>,
}

impl TaskResult {
    /// Start an empty result with a freshly generated run UUID.
    pub fn new(identifier: impl Into<String>, start_time: DateTime<Utc>) -> Self {
        Self::with_run_uuid(identifier, start_time, Uuid::new_v4())
    }

    pub fn with_run_uuid(
        identifier: impl Into<String>,
        start_time: DateTime<Utc>,
        task_run_uuid: Uuid,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            task_run_uuid,
            start_time,
            end_time: None,
            schema_info: None,
            step_history: Vec::new(),
            async_results: Vec::new(),
        }
    }

    pub fn with_schema_info(mut self, schema_info: Option<SchemaInfo>) -> Self {
        self.schema_info = schema_info;
        self
    }

    /// Completed step results in completion order.
    pub fn step_history(&self) -> &[StepResult] {
        &self.step_history
    }

    pub fn async_results(&self) -> &[StepResult] {
        &self.async_results
    }

    /// Replace any entry with the same identifier and append `result` last.
    pub fn add_step_history(&self, result: StepResult) -> Self {
        Self {
            step_history: replace_and_append(&self.step_history, result),
            ..self.clone()
        }
    }

    pub fn add_async_result(&self, result: StepResult) -> Self {
        Self {
            async_results: replace_and_append(&self.async_results, result),
            ..self.clone()
        }
    }

    /// Drop the first entry for `identifier` and everything recorded after it.
    ///
    /// An identifier that is not in the history yields an unchanged copy.
    pub fn remove_step_history(&self, identifier: &str) -> Self {
        Self {
            step_history: truncate_at(&self.step_history, identifier),
            ..self.clone()
        }
    }

    pub fn remove_async_result(&self, identifier: &str) -> Self {
        Self {
            async_results: truncate_at(&self.async_results, identifier),
            ..self.clone()
        }
    }

    pub fn finished(&self, end_time: DateTime<Utc>) -> Self {
        Self {
            end_time: Some(end_time),
            ..self.clone()
        }
    }

    pub fn get_result(&self, identifier: &str) -> Option<&StepResult> {
        self.step_history
            .iter()
            .find(|result| result.identifier == identifier)
    }

    pub fn get_result_for_step(&self, step: &Step) -> Option<&StepResult> {
        self.get_result(&step.identifier)
    }

    /// The step result for `identifier`, only if it holds an answer.
    pub fn get_answer_result(&self, identifier: &str) -> Option<&StepResult> {
        self.get_result(identifier)
            .filter(|result| result.as_answer().is_some())
    }

    pub fn get_async_result(&self, identifier: &str) -> Option<&StepResult> {
        self.async_results
            .iter()
            .find(|result| result.identifier == identifier)
    }

    /// Step history entries whose identifier matches `pattern`.
    pub fn get_results_matching_regex(&self, pattern: &Regex) -> Vec<&StepResult> {
        self.step_history
            .iter()
            .filter(|result| pattern.is_match(&result.identifier))
            .collect()
    }

    /// Identifiers in the step history, in completion order.
    pub fn completed_identifiers(&self) -> impl Iterator<Item = &str> {
        self.step_history
            .iter()
            .map(|result| result.identifier.as_str())
    }
}

fn replace_and_append(list: &[StepResult], result: StepResult) -> Vec<StepResult> {
    let mut out: Vec<StepResult> = list
        .iter()
        .filter(|existing| existing.identifier != result.identifier)
        .cloned()
        .collect();
    out.push(result);
    out
}

fn truncate_at(list: &[StepResult], identifier: &str) -> Vec<StepResult> {
    match list.iter().position(|result| result.identifier == identifier) {
        Some(idx) => list[..idx].to_vec(),
        None => list.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::result::AnswerType;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap()
    }

    fn history_ids(result: &TaskResult) -> Vec<&str> {
        result.completed_identifiers().collect()
    }

    fn with_history(ids: &[&str]) -> TaskResult {
        ids.iter().fold(TaskResult::new("task", t0()), |acc, id| {
            acc.add_step_history(StepResult::base(*id, t0()))
        })
    }

    #[test]
    fn new_result_is_empty_with_fresh_uuid() {
        let a = TaskResult::new("task", t0());
        let b = TaskResult::new("task", t0());
        assert!(a.step_history().is_empty());
        assert!(a.async_results().is_empty());
        assert_ne!(a.task_run_uuid, b.task_run_uuid);
    }

    #[test]
    fn add_step_history_returns_new_value() {
        let empty = TaskResult::new("task", t0());
        let one = empty.add_step_history(StepResult::base("a", t0()));
        assert!(empty.step_history().is_empty());
        assert_eq!(history_ids(&one), vec!["a"]);
        assert_eq!(one.task_run_uuid, empty.task_run_uuid);
    }

    /// Re-adding an identifier replaces the old entry and moves it to the end.
    #[test]
    fn add_step_history_replaces_and_appends() {
        let result = with_history(&["a", "b", "c"]);
        let updated = result.add_step_history(StepResult::answer("a", t0(), AnswerType::Boolean, true));

        assert_eq!(history_ids(&updated), vec!["b", "c", "a"]);
        assert_eq!(updated.step_history().len(), result.step_history().len());
        assert!(updated.get_answer_result("a").is_some());
    }

    #[test]
    fn async_results_follow_the_same_rule_independently() {
        let result = with_history(&["a"])
            .add_async_result(StepResult::file("motion", t0(), "json", "motion.json"))
            .add_async_result(StepResult::file("audio", t0(), "m4a", "audio.m4a"))
            .add_async_result(StepResult::file("motion", t0(), "json", "motion-2.json"));

        let async_ids: Vec<&str> = result
            .async_results()
            .iter()
            .map(|r| r.identifier.as_str())
            .collect();
        assert_eq!(async_ids, vec!["audio", "motion"]);
        assert_eq!(history_ids(&result), vec!["a"]);
    }

    #[test]
    fn remove_step_history_truncates_at_first_occurrence() {
        let result = with_history(&["a", "b", "c", "d"]);
        let truncated = result.remove_step_history("b");
        assert_eq!(history_ids(&truncated), vec!["a"]);
        assert_eq!(history_ids(&result), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn remove_step_history_missing_identifier_is_noop() {
        let result = with_history(&["a", "b"]);
        assert_eq!(result.remove_step_history("zzz"), result);
    }

    #[test]
    fn remove_async_result_truncates_async_list_only() {
        let result = with_history(&["a"])
            .add_async_result(StepResult::base("x", t0()))
            .add_async_result(StepResult::base("y", t0()));
        let truncated = result.remove_async_result("x");
        assert!(truncated.async_results().is_empty());
        assert_eq!(history_ids(&truncated), vec!["a"]);
    }

    #[test]
    fn get_answer_result_ignores_non_answers() {
        let result = with_history(&["a"]);
        assert!(result.get_result("a").is_some());
        assert!(result.get_answer_result("a").is_none());
        assert!(result.get_result("missing").is_none());
    }

    #[test]
    fn regex_query_filters_step_history() {
        let result = with_history(&["step4.A", "step4.B", "step5.X"]);
        let pattern = Regex::new(r"^step4\.").expect("regex");
        let ids: Vec<&str> = result
            .get_results_matching_regex(&pattern)
            .into_iter()
            .map(|r| r.identifier.as_str())
            .collect();
        assert_eq!(ids, vec!["step4.A", "step4.B"]);

        let none = Regex::new("nothing").expect("regex");
        assert!(result.get_results_matching_regex(&none).is_empty());
    }

    #[test]
    fn serializes_round_trip_with_histories() {
        let result = with_history(&["a"])
            .add_async_result(StepResult::base("x", t0()))
            .finished(t0());
        let json = serde_json::to_string(&result).expect("serialize");
        let parsed: TaskResult = serde_json::from_str(&json).expect("parse");
        assert_eq!(parsed, result);
    }

    #[test]
    fn get_result_for_step_matches_identifier() {
        let result = with_history(&["a", "b"]);
        let step = Step::base("b");
        assert_eq!(
            result.get_result_for_step(&step).map(|r| r.identifier.as_str()),
            Some("b")
        );
        assert!(result.get_result_for_step(&Step::base("c")).is_none());
    }
}
