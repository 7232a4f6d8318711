//! Wrapping of bare root actions (H003).

use crate::element::{AttributeValue, ElementId, ElementTree, SerializedElement};
use crate::error::{Diagnostic, Diagnostics, Severity};
use crate::registry::{ElementKind, ElementSubType, ElementTag};

pub const WRAPPER_PREFIX: &str = "auto_wrapping_state";

/// Wrap each root child that is neither a state nor a declaration in its own
/// state, keeping its position. Returns the number of wrappers created.
pub fn wrap_root_actions(tree: &mut ElementTree, root: ElementId, diagnostics: &mut Diagnostics) -> usize {
    let targets: Vec<ElementId> = tree
        .children(root)
        .iter()
        .copied()
        .filter(|c| {
            let child = tree.get(*c);
            !child.is_state() && !child.tag.is_declaration()
        })
        .collect();

    for &child in &targets {
        let wrapper_id = tree.next_generated_id(WRAPPER_PREFIX);
        let (kind, span, tag) = {
            let node = tree.get(child);
            (node.kind, node.span, node.tag)
        };

        let key = tree.next_key();
        let mut wrapper = SerializedElement::new(key, ElementTag::State, vec![wrapper_id.clone()], span)
            .with_attribute("id", AttributeValue::string(wrapper_id.clone()));
        if kind == ElementKind::Output {
            wrapper.sub_type = Some(ElementSubType::Output);
        }

        let wrapper = tree.alloc(wrapper);
        tree.replace_child(root, child, wrapper);
        tree.append_child(wrapper, child);
        tree.rescope(child, std::slice::from_ref(&wrapper_id));

        diagnostics.push(Diagnostic::heal(
            Severity::Information,
            "H003",
            format!("<{}> at line {} was wrapped in state '{}'", tag, span.start.line, wrapper_id),
        ));
    }

    targets.len()
}
