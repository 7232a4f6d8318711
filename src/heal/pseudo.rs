//! `final` and `error` pseudo-states (H001, H002).

use crate::element::{AttributeValue, ElementId, ElementTree, SerializedElement};
use crate::error::{Diagnostic, Diagnostics, Severity};
use crate::parse::Span;
use crate::registry::{ElementSubType, ElementTag};

pub const FINAL_ID: &str = "final";
pub const ERROR_ID: &str = "error";

/// Append whichever pseudo-states the root is missing. Returns how many were
/// added.
pub fn ensure_pseudo_states(tree: &mut ElementTree, root: ElementId, diagnostics: &mut Diagnostics) -> usize {
    let mut added = 0;

    if !tree.children(root).iter().any(|c| tree.get(*c).tag == ElementTag::Final) {
        add_state(tree, root, ElementTag::Final, FINAL_ID, None);
        diagnostics.push(Diagnostic::heal(
            Severity::Warning,
            "H001",
            "Workflow has no <final> state; one was added",
        ));
        added += 1;
    }

    if !tree.state_children(root).any(|c| tree.get(c).is_error_state()) {
        add_state(tree, root, ElementTag::State, ERROR_ID, Some(ElementSubType::Error));
        diagnostics.push(Diagnostic::heal(
            Severity::Warning,
            "H002",
            "Workflow has no 'error' state; one was added",
        ));
        added += 1;
    }

    added
}

fn add_state(
    tree: &mut ElementTree,
    root: ElementId,
    tag: ElementTag,
    id: &str,
    sub_type: Option<ElementSubType>,
) -> ElementId {
    let key = tree.next_key();
    let mut element = SerializedElement::new(key, tag, vec![id.to_string()], Span::default())
        .with_attribute("id", AttributeValue::string(id));
    if sub_type.is_some() {
        element.sub_type = sub_type;
    }
    log::debug!(id = id, tag:% = tag; "Synthesized pseudo-state");
    tree.add(element, Some(root))
}
