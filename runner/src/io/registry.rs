//! Step decoding dispatch table.
//!
//! Maps the JSON `type` tag of a step to a decoder for its payload. The table
//! is an ordinary value built once and handed to the loaders, so hosts can
//! register their own step types without touching global state.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::async_action::AsyncActionConfiguration;
use crate::core::error::LoadError;
use crate::core::step::{
    ActiveStep, FormStep, SectionStep, Step, StepKind, TransformerStep, UiStep, step_type,
};

/// Decodes the payload of one step. Receives the registry for nested steps.
pub type StepDecoder = fn(&StepRegistry, &Value) -> Result<StepKind, LoadError>;

#[derive(Clone)]
pub struct StepRegistry {
    decoders: HashMap<String, StepDecoder>,
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl StepRegistry {
    /// Empty table with no step types.
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        registry.register(step_type::BASE, decode_base);
        for tag in [
            step_type::UI,
            step_type::INSTRUCTION,
            step_type::OVERVIEW,
            step_type::COMPLETION,
        ] {
            registry.register(tag, decode_ui);
        }
        registry.register(step_type::ACTIVE, decode_active);
        registry.register(step_type::COUNTDOWN, decode_active);
        registry.register(step_type::FORM, decode_form);
        registry.register(step_type::SECTION, decode_section);
        registry.register(step_type::TRANSFORM, decode_transformer);
        registry
    }

    /// Add or replace the decoder for `tag`.
    pub fn register(&mut self, tag: impl Into<String>, decoder: StepDecoder) {
        self.decoders.insert(tag.into(), decoder);
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.decoders.contains_key(tag)
    }

    /// Decode one step object: `identifier`, `type`, optional `asyncActions`
    /// and the payload picked by `type`.
    pub fn decode_step(&self, value: &Value) -> Result<Step, LoadError> {
        let identifier = required_str(value, "identifier", "step")?;
        let context = format!("step '{identifier}'");
        let tag = required_str(value, "type", &context)?;
        let decoder = self
            .decoders
            .get(tag)
            .ok_or_else(|| LoadError::UnknownStepType {
                step_type: tag.to_string(),
                identifier: identifier.to_string(),
            })?;

        let async_actions = match value.get("asyncActions") {
            Some(Value::Null) | None => Vec::new(),
            Some(raw) => decode_async_actions(raw)?,
        };

        Ok(Step {
            identifier: identifier.to_string(),
            step_type: tag.to_string(),
            async_actions,
            kind: decoder(self, value)?,
        })
    }

    /// Decode a JSON array of step objects.
    pub fn decode_steps(&self, value: &Value, context: &str) -> Result<Vec<Step>, LoadError> {
        let items = value
            .as_array()
            .ok_or_else(|| LoadError::missing_field("steps", context))?;
        items.iter().map(|item| self.decode_step(item)).collect()
    }
}

pub fn decode_async_actions(value: &Value) -> Result<Vec<AsyncActionConfiguration>, LoadError> {
    Ok(serde_json::from_value(value.clone())?)
}

fn required_str<'a>(value: &'a Value, field: &str, context: &str) -> Result<&'a str, LoadError> {
    value
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| LoadError::missing_field(field, context))
}

fn payload<T: DeserializeOwned>(value: &Value) -> Result<T, LoadError> {
    Ok(serde_json::from_value(value.clone())?)
}

fn decode_base(_: &StepRegistry, _: &Value) -> Result<StepKind, LoadError> {
    Ok(StepKind::Base {})
}

fn decode_ui(_: &StepRegistry, value: &Value) -> Result<StepKind, LoadError> {
    Ok(StepKind::Ui(payload::<UiStep>(value)?))
}

fn decode_active(_: &StepRegistry, value: &Value) -> Result<StepKind, LoadError> {
    Ok(StepKind::Active(payload::<ActiveStep>(value)?))
}

fn decode_form(_: &StepRegistry, value: &Value) -> Result<StepKind, LoadError> {
    Ok(StepKind::Form(payload::<FormStep>(value)?))
}

fn decode_section(registry: &StepRegistry, value: &Value) -> Result<StepKind, LoadError> {
    let identifier = value
        .get("identifier")
        .and_then(Value::as_str)
        .unwrap_or_default();
    let context = format!("section '{identifier}'");
    let children = value
        .get("steps")
        .ok_or_else(|| LoadError::missing_field("steps", &context))?;
    Ok(StepKind::Section(SectionStep {
        steps: registry.decode_steps(children, &context)?,
    }))
}

fn decode_transformer(_: &StepRegistry, value: &Value) -> Result<StepKind, LoadError> {
    if value
        .pointer("/resourceTransformer/resourceName")
        .and_then(Value::as_str)
        .is_none()
    {
        let identifier = value
            .get("identifier")
            .and_then(Value::as_str)
            .unwrap_or_default();
        return Err(LoadError::missing_field(
            "resourceTransformer.resourceName",
            format!("step '{identifier}'"),
        ));
    }
    Ok(StepKind::Transformer(payload::<TransformerStep>(value)?))
}
