//! Inline transformer placeholders and namespace the identifiers they bring in.

use tracing::debug;

use crate::core::error::LoadError;
use crate::core::step::Step;

/// Fetches the raw step tree a transformer points at.
///
/// Implementations decode the named resource but never resolve it; nested
/// transformers are expanded by [`resolve_transformers`].
pub trait ResourceLoader {
    fn load_section(&self, name: &str) -> Result<Step, LoadError>;
}

/// Resolve every transformer in `steps`, starting from an empty prefix.
pub fn resolve_steps(
    steps: &[Step],
    separator: &str,
    loader: &dyn ResourceLoader,
) -> Result<Vec<Step>, LoadError> {
    let mut expanding = Vec::new();
    steps
        .iter()
        .map(|step| resolve_with_stack(step, "", separator, loader, &mut expanding))
        .collect()
}

/// Resolve one step under `prefix`.
///
/// A transformer becomes the section it loads, renamed to the transformer's
/// identifier. Section children are resolved under
/// `prefix + section + separator`, and every step gets `prefix` prepended
/// exactly once, so identifiers in the result are full paths.
pub fn resolve_transformers(
    step: &Step,
    prefix: &str,
    separator: &str,
    loader: &dyn ResourceLoader,
) -> Result<Step, LoadError> {
    let mut expanding = Vec::new();
    resolve_with_stack(step, prefix, separator, loader, &mut expanding)
}

fn resolve_with_stack(
    step: &Step,
    prefix: &str,
    separator: &str,
    loader: &dyn ResourceLoader,
    expanding: &mut Vec<String>,
) -> Result<Step, LoadError> {
    if let Some(name) = step.resource_name() {
        if expanding.iter().any(|open| open == name) {
            let mut chain = expanding.clone();
            chain.push(name.to_string());
            return Err(LoadError::TransformerCycle { chain });
        }

        let loaded = loader.load_section(name)?;
        if !loaded.is_section() {
            return Err(LoadError::TransformerNotSection {
                name: name.to_string(),
                found: loaded.step_type,
            });
        }
        debug!(step = %step.identifier, resource = %name, prefix, "expanding transformer");

        let mut renamed = loaded.copy_with_identifier(step.identifier.clone());
        renamed.async_actions.extend(step.async_actions.iter().cloned());

        expanding.push(name.to_string());
        let resolved = resolve_with_stack(&renamed, prefix, separator, loader, expanding);
        expanding.pop();
        return resolved;
    }

    let identifier = format!("{prefix}{}", step.identifier);
    match step.children() {
        Some(children) => {
            let child_prefix = format!("{identifier}{separator}");
            let resolved = children
                .iter()
                .map(|child| resolve_with_stack(child, &child_prefix, separator, loader, expanding))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(step.copy_with_steps(resolved).copy_with_identifier(identifier))
        }
        None => Ok(step.copy_with_identifier(identifier)),
    }
}
