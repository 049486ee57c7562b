//! Step tree value types.
//!
//! A [`Step`] is an immutable node: an identifier, the type tag it was decoded
//! from, the async actions declared on it and a variant payload ([`StepKind`]).
//! Sections own their children outright; nothing holds a parent pointer.
//! "Changing" a step always goes through one of the `copy_with_*` helpers.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::core::async_action::AsyncActionConfiguration;

/// Type tags understood by the built-in decoders.
pub mod step_type {
    pub const BASE: &str = "base";
    pub const UI: &str = "ui";
    pub const INSTRUCTION: &str = "instruction";
    pub const OVERVIEW: &str = "overview";
    pub const COMPLETION: &str = "completion";
    pub const ACTIVE: &str = "active";
    pub const COUNTDOWN: &str = "countdown";
    pub const FORM: &str = "form";
    pub const SECTION: &str = "section";
    pub const TRANSFORM: &str = "transform";
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub identifier: String,
    #[serde(rename = "type")]
    pub step_type: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub async_actions: Vec<AsyncActionConfiguration>,
    #[serde(flatten)]
    pub kind: StepKind,
}

/// The closed set of step variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepKind {
    Base {},
    Ui(UiStep),
    Active(ActiveStep),
    Form(FormStep),
    Section(SectionStep),
    Transformer(TransformerStep),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiStep {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footnote: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub actions: BTreeMap<String, Action>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub hidden_actions: BTreeSet<String>,
}

/// A button override for one of the step's navigation actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Action {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub button_title: Option<String>,
    #[serde(rename = "buttonIcon", skip_serializing_if = "Option::is_none")]
    pub button_icon_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActiveStep {
    #[serde(flatten)]
    pub ui: UiStep,
    /// Seconds the measurement runs for.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    pub background_audio_required: bool,
    /// Instruction text keyed by the second (or `start`/`end`) it is spoken at.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub spoken_instructions: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub commands: BTreeSet<Command>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Command {
    PlaySoundOnStart,
    PlaySoundOnFinish,
    PlaySound,
    VibrateOnStart,
    VibrateOnFinish,
    Vibrate,
    StartTimerAutomatically,
    ContinueOnFinish,
    TransitionAutomatically,
    ShouldDisableIdleTimer,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormStep {
    #[serde(flatten)]
    pub ui: UiStep,
    pub input_fields: Vec<InputField>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputField {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ui_hint: Option<String>,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SectionStep {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformerStep {
    pub resource_transformer: ResourceTransformer,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTransformer {
    pub resource_name: String,
}

impl Step {
    pub fn base(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            step_type: step_type::BASE.to_string(),
            async_actions: Vec::new(),
            kind: StepKind::Base {},
        }
    }

    pub fn section(identifier: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            identifier: identifier.into(),
            step_type: step_type::SECTION.to_string(),
            async_actions: Vec::new(),
            kind: StepKind::Section(SectionStep { steps }),
        }
    }

    pub fn transformer(identifier: impl Into<String>, resource_name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            step_type: step_type::TRANSFORM.to_string(),
            async_actions: Vec::new(),
            kind: StepKind::Transformer(TransformerStep {
                resource_transformer: ResourceTransformer {
                    resource_name: resource_name.into(),
                },
            }),
        }
    }

    pub fn with_async_actions(mut self, actions: Vec<AsyncActionConfiguration>) -> Self {
        self.async_actions = actions;
        self
    }

    pub fn is_section(&self) -> bool {
        matches!(self.kind, StepKind::Section(_))
    }

    pub fn is_leaf(&self) -> bool {
        !self.is_section()
    }

    /// Child steps of a section, or `None` for every other variant.
    pub fn children(&self) -> Option<&[Step]> {
        match &self.kind {
            StepKind::Section(section) => Some(&section.steps),
            _ => None,
        }
    }

    pub fn resource_name(&self) -> Option<&str> {
        match &self.kind {
            StepKind::Transformer(t) => Some(&t.resource_transformer.resource_name),
            _ => None,
        }
    }

    pub fn ui(&self) -> Option<&UiStep> {
        match &self.kind {
            StepKind::Ui(ui) => Some(ui),
            StepKind::Active(active) => Some(&active.ui),
            StepKind::Form(form) => Some(&form.ui),
            _ => None,
        }
    }

    pub fn copy_with_identifier(&self, identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            ..self.clone()
        }
    }

    /// Returns a copy with `steps` as children. Non-section steps are returned unchanged.
    pub fn copy_with_steps(&self, steps: Vec<Step>) -> Self {
        match &self.kind {
            StepKind::Section(_) => Self {
                kind: StepKind::Section(SectionStep { steps }),
                ..self.clone()
            },
            _ => self.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copy_with_identifier_leaves_original_untouched() {
        let step = Step::base("a");
        let copy = step.copy_with_identifier("b");
        assert_eq!(step.identifier, "a");
        assert_eq!(copy.identifier, "b");
        assert_eq!(copy.kind, step.kind);
    }

    #[test]
    fn copy_with_steps_replaces_section_children_only() {
        let section = Step::section("s", vec![Step::base("a")]);
        let replaced = section.copy_with_steps(vec![Step::base("b"), Step::base("c")]);
        let ids: Vec<&str> = replaced
            .children()
            .expect("section")
            .iter()
            .map(|step| step.identifier.as_str())
            .collect();
        assert_eq!(ids, vec!["b", "c"]);

        let leaf = Step::base("x");
        assert_eq!(leaf.copy_with_steps(vec![Step::base("y")]), leaf);
    }

    #[test]
    fn section_serializes_with_type_and_children() {
        let section = Step::section("s", vec![Step::base("a")]);
        let value = serde_json::to_value(&section).expect("serialize");
        assert_eq!(value["type"], "section");
        assert_eq!(value["steps"][0]["identifier"], "a");
        assert_eq!(value["steps"][0]["type"], "base");
    }

    #[test]
    fn transformer_exposes_resource_name() {
        let step = Step::transformer("t", "foo_sub");
        assert_eq!(step.resource_name(), Some("foo_sub"));
        assert!(step.is_leaf());
    }

    #[test]
    fn ui_payload_is_shared_by_ui_variants() {
        let ui = UiStep {
            title: Some("Tap".to_string()),
            ..UiStep::default()
        };
        let active = Step {
            identifier: "tap".to_string(),
            step_type: step_type::ACTIVE.to_string(),
            async_actions: Vec::new(),
            kind: StepKind::Active(ActiveStep {
                ui,
                ..ActiveStep::default()
            }),
        };
        assert_eq!(active.ui().and_then(|ui| ui.title.as_deref()), Some("Tap"));
        assert!(Step::base("b").ui().is_none());
    }
}
