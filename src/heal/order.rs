//! Canonical ordering of the root's children.

use crate::element::{ElementId, ElementTree};
use crate::registry::ElementSubType;

fn rank(tree: &ElementTree, id: ElementId) -> u8 {
    let element = tree.get(id);
    if element.tag.is_declaration() {
        0
    } else if element.is_error_state() || (element.is_state() && element.sub_type == Some(ElementSubType::Error)) {
        3
    } else if element.is_final() || element.sub_type == Some(ElementSubType::Output) {
        2
    } else {
        1
    }
}

/// Stable-sort the root's children: declarations, ordinary states,
/// output and final states, then the error state. Returns whether anything
/// moved.
pub fn sort_root_children(tree: &mut ElementTree, root: ElementId) -> bool {
    let mut children = tree.children(root).to_vec();
    children.sort_by_key(|c| rank(tree, *c));
    let moved = children.as_slice() != tree.children(root);
    if moved {
        tree.set_children(root, children);
    }
    moved
}
