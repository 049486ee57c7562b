//! Traversal primitives over step trees.
//!
//! Steps never point at their parent, so everything parent-relative is a
//! top-down descent from the root list.

use std::collections::HashSet;

use crate::core::error::LoadError;
use crate::core::step::Step;

/// Descend through first children until a non-section step is reached.
pub fn left_most_leaf(step: &Step) -> Result<&Step, LoadError> {
    descend(step, |children| children.first())
}

/// Descend through last children until a non-section step is reached.
pub fn right_most_leaf(step: &Step) -> Result<&Step, LoadError> {
    descend(step, |children| children.last())
}

fn descend<'a>(
    step: &'a Step,
    pick: impl Fn(&'a [Step]) -> Option<&'a Step>,
) -> Result<&'a Step, LoadError> {
    let mut current = step;
    while let Some(children) = current.children() {
        current = pick(children).ok_or_else(|| LoadError::EmptySection {
            identifier: current.identifier.clone(),
        })?;
    }
    Ok(current)
}

/// Depth-first search for `identifier` across the whole tree.
pub fn find_step<'a>(steps: &'a [Step], identifier: &str) -> Option<&'a Step> {
    for step in steps {
        if step.identifier == identifier {
            return Some(step);
        }
        if let Some(found) = step.children().and_then(|c| find_step(c, identifier)) {
            return Some(found);
        }
    }
    None
}

/// Ancestor chain from the root list down to `identifier`, inclusive.
pub fn step_path<'a>(steps: &'a [Step], identifier: &str) -> Option<Vec<&'a Step>> {
    let mut path = Vec::new();
    if step_path_inner(steps, identifier, &mut path) {
        return Some(path);
    }
    None
}

fn step_path_inner<'a>(steps: &'a [Step], identifier: &str, path: &mut Vec<&'a Step>) -> bool {
    for step in steps {
        path.push(step);
        if step.identifier == identifier {
            return true;
        }
        if step
            .children()
            .is_some_and(|children| step_path_inner(children, identifier, path))
        {
            return true;
        }
        path.pop();
    }
    false
}

/// Pre-order flattening of every step, sections included.
pub fn flatten(steps: &[Step]) -> Vec<&Step> {
    let mut out = Vec::new();
    flatten_into(steps, &mut out);
    out
}

fn flatten_into<'a>(steps: &'a [Step], out: &mut Vec<&'a Step>) {
    for step in steps {
        out.push(step);
        if let Some(children) = step.children() {
            flatten_into(children, out);
        }
    }
}

/// Non-section steps in pre-order.
pub fn leaves(steps: &[Step]) -> Vec<&Step> {
    flatten(steps)
        .into_iter()
        .filter(|step| step.is_leaf())
        .collect()
}

pub fn leaf_count(steps: &[Step]) -> usize {
    steps
        .iter()
        .map(|step| step.children().map_or(1, leaf_count))
        .sum()
}

/// Check identifiers of a raw definition: non-empty and unique among
/// siblings at every level.
///
/// The same identifier may appear under different sections; resolution
/// prefixes nested identifiers with their section path.
pub fn validate_sibling_identifiers(steps: &[Step]) -> Result<(), LoadError> {
    validate_level(steps, "<root>", &mut None)
}

/// Check identifiers of a resolved tree: non-empty, and unique across the
/// whole tree.
///
/// Returns the first violation found in pre-order.
pub fn validate_identifiers(steps: &[Step]) -> Result<(), LoadError> {
    validate_level(steps, "<root>", &mut Some(HashSet::new()))
}

fn validate_level<'a>(
    steps: &'a [Step],
    path: &str,
    seen: &mut Option<HashSet<&'a str>>,
) -> Result<(), LoadError> {
    let mut siblings = HashSet::new();
    for step in steps {
        let identifier = step.identifier.as_str();
        if identifier.trim().is_empty() {
            return Err(LoadError::EmptyIdentifier {
                path: path.to_string(),
            });
        }
        let unique_in_tree = seen.as_mut().is_none_or(|seen| seen.insert(identifier));
        if !siblings.insert(identifier) || !unique_in_tree {
            return Err(LoadError::DuplicateIdentifier {
                identifier: step.identifier.clone(),
                path: path.to_string(),
            });
        }
        if let Some(children) = step.children() {
            let child_path = format!("{}/{}", path, step.identifier);
            validate_level(children, &child_path, seen)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{leaf, navigator_fixture_steps, section};

    fn ids(steps: Vec<&Step>) -> Vec<&str> {
        steps.into_iter().map(|s| s.identifier.as_str()).collect()
    }

    #[test]
    fn left_and_right_most_leaf_descend_nested_sections() {
        let tree = section(
            "outer",
            vec![
                section("first", vec![leaf("a"), leaf("b")]),
                leaf("c"),
                section("last", vec![leaf("d"), section("inner", vec![leaf("e")])]),
            ],
        );
        assert_eq!(left_most_leaf(&tree).expect("left").identifier, "a");
        assert_eq!(right_most_leaf(&tree).expect("right").identifier, "e");
    }

    #[test]
    fn left_most_leaf_of_leaf_is_itself() {
        let step = leaf("solo");
        assert_eq!(left_most_leaf(&step).expect("left").identifier, "solo");
    }

    #[test]
    fn empty_section_is_an_error() {
        let tree = section("outer", vec![section("empty", Vec::new())]);
        let err = right_most_leaf(&tree).expect_err("empty section");
        assert!(matches!(err, LoadError::EmptySection { identifier } if identifier == "empty"));
    }

    #[test]
    fn find_step_searches_into_sections() {
        let steps = navigator_fixture_steps();
        assert_eq!(find_step(&steps, "step4.C").expect("found").identifier, "step4.C");
        assert_eq!(find_step(&steps, "step5").expect("found").identifier, "step5");
        assert!(find_step(&steps, "nope").is_none());
    }

    #[test]
    fn step_path_lists_ancestors() {
        let steps = navigator_fixture_steps();
        let path = step_path(&steps, "step6.B").expect("path");
        assert_eq!(ids(path), vec!["step6", "step6.B"]);
        assert!(step_path(&steps, "nope").is_none());
    }

    #[test]
    fn flatten_is_pre_order_and_leaves_skip_sections() {
        let steps = vec![leaf("a"), section("s", vec![leaf("s.1"), leaf("s.2")]), leaf("b")];
        assert_eq!(ids(flatten(&steps)), vec!["a", "s", "s.1", "s.2", "b"]);
        assert_eq!(ids(leaves(&steps)), vec!["a", "s.1", "s.2", "b"]);
        assert_eq!(leaf_count(&steps), 4);
    }

    #[test]
    fn validate_identifiers_reports_sibling_duplicates() {
        let steps = vec![leaf("a"), leaf("a")];
        let err = validate_identifiers(&steps).expect_err("duplicate");
        assert!(err.to_string().contains("duplicate step identifier 'a'"));
    }

    #[test]
    fn sibling_check_allows_repeats_under_different_sections() {
        let steps = vec![
            section("left", vec![leaf("instruction"), leaf("tap")]),
            section("right", vec![leaf("instruction"), leaf("tap")]),
        ];
        validate_sibling_identifiers(&steps).expect("valid raw tree");
    }

    #[test]
    fn sibling_check_still_rejects_duplicates_within_a_section() {
        let steps = vec![section("s", vec![leaf("a"), leaf("a")])];
        let err = validate_sibling_identifiers(&steps).expect_err("duplicate");
        assert!(matches!(
            err,
            LoadError::DuplicateIdentifier { identifier, path } if identifier == "a" && path == "<root>/s"
        ));
    }

    #[test]
    fn validate_identifiers_reports_tree_wide_duplicates() {
        let steps = vec![leaf("a"), section("s", vec![leaf("a")])];
        let err = validate_identifiers(&steps).expect_err("duplicate");
        assert!(err.to_string().contains("<root>/s"));
    }

    #[test]
    fn validate_identifiers_rejects_blank_identifier() {
        let steps = vec![section("s", vec![leaf(" ")])];
        assert!(matches!(
            validate_identifiers(&steps),
            Err(LoadError::EmptyIdentifier { .. })
        ));
        assert!(matches!(
            validate_sibling_identifiers(&steps),
            Err(LoadError::EmptyIdentifier { .. })
        ));
    }

    #[test]
    fn validate_identifiers_accepts_navigator_fixture() {
        validate_identifiers(&navigator_fixture_steps()).expect("valid");
    }
}
