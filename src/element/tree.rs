//! Arena storage for the element tree.
//!
//! Nodes are appended to a vector and addressed by index; parent links are
//! indices too. The healer's sibling and ancestor walks are plain lookups.

use indexmap::IndexMap;
use serde::Serialize;

use super::types::{AttributeValue, ElementId, SerializedElement};
use crate::parse::Span;
use crate::registry::{ElementKind, ElementSubType, ElementTag};

/// Monotonic counter owned by one compilation. Supplies element keys and the
/// numeric suffixes of synthesized ids.
#[derive(Debug, Clone, Default)]
pub struct KeySequence {
    next: u64,
}

impl KeySequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_value(&mut self) -> u64 {
        let value = self.next;
        self.next += 1;
        value
    }
}

#[derive(Debug, Clone, Default)]
pub struct ElementTree {
    nodes: Vec<SerializedElement>,
    roots: Vec<ElementId>,
    keys: KeySequence,
}

impl ElementTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_key(&mut self) -> String {
        format!("el_{}", self.keys.next_value())
    }

    /// A fresh identifier such as `anonymous_state_7`.
    pub fn next_generated_id(&mut self, prefix: &str) -> String {
        format!("{}_{}", prefix, self.keys.next_value())
    }

    /// Store `element` without attaching it anywhere.
    pub fn alloc(&mut self, mut element: SerializedElement) -> ElementId {
        element.parent = None;
        element.children.clear();
        let id = ElementId(self.nodes.len());
        self.nodes.push(element);
        id
    }

    /// Store `element` as the last child of `parent`, or as a new root.
    pub fn add(&mut self, element: SerializedElement, parent: Option<ElementId>) -> ElementId {
        let id = self.alloc(element);
        match parent {
            Some(parent) => self.append_child(parent, id),
            None => self.roots.push(id),
        }
        id
    }

    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Put `replacement` where `old` sits among its parent's children and
    /// detach `old`.
    pub fn replace_child(&mut self, parent: ElementId, old: ElementId, replacement: ElementId) {
        if let Some(slot) = self.nodes[parent.0].children.iter_mut().find(|c| **c == old) {
            *slot = replacement;
            self.nodes[replacement.0].parent = Some(parent);
            self.nodes[old.0].parent = None;
        }
    }

    pub fn get(&self, id: ElementId) -> &SerializedElement {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: ElementId) -> &mut SerializedElement {
        &mut self.nodes[id.0]
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        &self.nodes[id.0].children
    }

    pub fn set_children(&mut self, id: ElementId, children: Vec<ElementId>) {
        self.nodes[id.0].children = children;
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.nodes[id.0].parent
    }

    pub fn roots(&self) -> &[ElementId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn workflow_root(&self) -> Option<ElementId> {
        self.roots
            .iter()
            .copied()
            .find(|id| self.get(*id).is_workflow())
    }

    /// `id` and everything below it, pre-order.
    pub fn descendants(&self, id: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    /// Every node reachable from the roots, pre-order.
    pub fn attached(&self) -> Vec<ElementId> {
        self.roots
            .iter()
            .flat_map(|root| self.descendants(*root))
            .collect()
    }

    pub fn state_children(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|c| self.get(*c).is_state())
    }

    /// The workflow's `error` pseudo-state: a state with id `error` directly
    /// under the workflow root. A nested `error` is an ordinary state.
    pub fn is_error_pseudo_state(&self, id: ElementId) -> bool {
        self.get(id).is_error_state() && self.parent(id).is_some_and(|p| self.get(p).is_workflow())
    }

    pub fn has_conditionless_transition(&self, id: ElementId) -> bool {
        self.children(id)
            .iter()
            .any(|c| self.get(*c).is_conditionless_transition())
    }

    /// Prepend `prefix` to the scope of `id` and its whole subtree.
    pub fn rescope(&mut self, id: ElementId, prefix: &[String]) {
        for node in self.descendants(id) {
            let scope = &mut self.nodes[node.0].scope;
            let mut rescoped = prefix.to_vec();
            rescoped.append(scope);
            *scope = rescoped;
        }
    }

    /// Nested, JSON-friendly view of the attached tree.
    pub fn to_serialized(&self) -> Vec<ElementSnapshot> {
        self.roots.iter().map(|r| self.snapshot(*r)).collect()
    }

    fn snapshot(&self, id: ElementId) -> ElementSnapshot {
        let node = self.get(id);
        ElementSnapshot {
            key: node.key.clone(),
            tag: node.tag,
            kind: node.kind,
            sub_type: node.sub_type,
            scope: node.scope.clone(),
            attributes: node.attributes.clone(),
            children: node.children.iter().map(|c| self.snapshot(*c)).collect(),
            parent_id: node.parent.map(|p| self.get(p).key.clone()),
            span: node.span,
        }
    }

    /// Indented one-line-per-node rendering, handy for assertions and logs.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for root in &self.roots {
            self.outline_node(*root, 0, &mut out);
        }
        out
    }

    fn outline_node(&self, id: ElementId, depth: usize, out: &mut String) {
        let node = self.get(id);
        out.push_str(&"  ".repeat(depth));
        out.push_str(node.tag.name());
        if let Some(node_id) = node.id() {
            out.push_str(&format!(" #{}", node_id));
        }
        if node.tag == ElementTag::Transition {
            if let Some(target) = node.attribute("target") {
                out.push_str(&format!(" -> {}", target.source_text()));
            }
            if let Some(cond) = node.attribute("cond") {
                out.push_str(&format!(" [{}]", cond.source_text()));
            }
        }
        if let Some(text) = node.text_value() {
            out.push_str(&format!(" {:?}", text));
        }
        out.push('\n');
        for child in &node.children {
            self.outline_node(*child, depth + 1, out);
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementSnapshot {
    pub key: String,
    pub tag: ElementTag,
    pub kind: ElementKind,
    pub sub_type: Option<ElementSubType>,
    pub scope: Vec<String>,
    pub attributes: IndexMap<String, AttributeValue>,
    pub children: Vec<ElementSnapshot>,
    pub parent_id: Option<String>,
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(tree: &mut ElementTree, id: &str, parent: Option<ElementId>) -> ElementId {
        let key = tree.next_key();
        let element = SerializedElement::new(key, ElementTag::State, vec![id.into()], Span::default())
            .with_attribute("id", AttributeValue::string(id));
        tree.add(element, parent)
    }

    #[test]
    fn keys_are_unique_per_tree() {
        let mut a = ElementTree::new();
        let mut b = ElementTree::new();
        assert_eq!(a.next_key(), "el_0");
        assert_eq!(a.next_key(), "el_1");
        assert_eq!(b.next_key(), "el_0");
        assert_eq!(a.next_generated_id("anonymous_state"), "anonymous_state_2");
    }

    #[test]
    fn replace_child_keeps_position() {
        let mut tree = ElementTree::new();
        let root = state(&mut tree, "root", None);
        let a = state(&mut tree, "a", Some(root));
        let b = state(&mut tree, "b", Some(root));
        let key = tree.next_key();
        let wrapper = tree.alloc(SerializedElement::new(key, ElementTag::State, vec![], Span::default()));

        tree.replace_child(root, a, wrapper);
        tree.append_child(wrapper, a);

        assert_eq!(tree.children(root), &[wrapper, b]);
        assert_eq!(tree.parent(a), Some(wrapper));
        assert_eq!(tree.parent(wrapper), Some(root));
    }

    #[test]
    fn rescope_prefixes_whole_subtree() {
        let mut tree = ElementTree::new();
        let a = state(&mut tree, "a", None);
        let b = state(&mut tree, "b", Some(a));
        tree.get_mut(b).scope = vec!["a".into(), "b".into()];

        tree.rescope(a, &["wrap".to_string()]);

        assert_eq!(tree.get(a).scope, vec!["wrap", "a"]);
        assert_eq!(tree.get(b).scope, vec!["wrap", "a", "b"]);
    }

    #[test]
    fn snapshot_uses_parent_key() {
        let mut tree = ElementTree::new();
        let root = state(&mut tree, "root", None);
        state(&mut tree, "child", Some(root));
        let snapshot = tree.to_serialized();
        assert_eq!(snapshot[0].children[0].parent_id.as_deref(), Some("el_0"));
    }
}
