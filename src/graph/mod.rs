//! Execution graph: the runtime-facing form of a healed element tree.
//!
//! Each [`ExecutionGraphElement`] is an immutable node shared through `Arc`.
//! A [`GraphBuilder`] memoizes nodes by element key and declared id, so
//! building the same subtree twice returns the same allocation.

mod rules;

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Serialize;

use crate::element::{AttributeValue, ElementId, ElementTree};
use crate::registry::{ElementKind, ElementSubType, ElementTag};

// =============================================================================
// GRAPH NODES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionGraphElement {
    /// Declared id, or the element key when the element has none.
    pub id: String,
    pub key: String,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub sub_type: Option<ElementSubType>,
    pub tag: ElementTag,
    pub scope: Vec<String>,
    /// Copied from the element; expressions stay unevaluated.
    pub attributes: IndexMap<String, AttributeValue>,
    pub children: Vec<Arc<ExecutionGraphElement>>,
}

impl ExecutionGraphElement {
    /// Depth-first search for the element whose id is `id`.
    pub fn find(&self, id: &str) -> Option<&ExecutionGraphElement> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Child states, in declaration order.
    pub fn states(&self) -> impl Iterator<Item = &ExecutionGraphElement> {
        self.children
            .iter()
            .map(Arc::as_ref)
            .filter(|c| c.kind == ElementKind::State)
    }

    /// Targets of this element's `transition` children.
    pub fn transition_targets(&self) -> Vec<&str> {
        self.children
            .iter()
            .filter(|c| c.tag == ElementTag::Transition)
            .filter_map(|c| c.attribute("target").and_then(AttributeValue::as_str))
            .collect()
    }
}

// =============================================================================
// BUILDER
// =============================================================================

type CacheKey = (String, Option<String>);

/// Builds execution graph nodes for one element tree. Element keys are only
/// unique within a tree, so a builder must not be shared across trees.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    cache: RwLock<HashMap<CacheKey, Arc<ExecutionGraphElement>>>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_cached_graph_element(&self, key: &str, id: Option<&str>) -> Option<Arc<ExecutionGraphElement>> {
        self.cache
            .read()
            .get(&(key.to_string(), id.map(str::to_string)))
            .cloned()
    }

    pub fn set_cached_graph_element(&self, key: &str, id: Option<&str>, element: Arc<ExecutionGraphElement>) {
        self.cache
            .write()
            .insert((key.to_string(), id.map(str::to_string)), element);
    }

    /// Build (or fetch) the graph node for `id` and its subtree.
    pub fn build(&self, tree: &ElementTree, id: ElementId) -> Arc<ExecutionGraphElement> {
        let element = tree.get(id);
        if let Some(cached) = self.get_cached_graph_element(&element.key, element.id()) {
            return cached;
        }

        let children: Vec<Arc<ExecutionGraphElement>> =
            element.children.iter().map(|c| self.build(tree, *c)).collect();
        let node = Arc::new(rules::construct(element, children));

        self.set_cached_graph_element(&element.key, element.id(), Arc::clone(&node));
        node
    }

    /// Build from the tree's workflow root.
    pub fn build_root(&self, tree: &ElementTree) -> Option<Arc<ExecutionGraphElement>> {
        let root = tree.workflow_root()?;
        let graph = self.build(tree, root);
        log::debug!(nodes = self.len(); "Built execution graph");
        Some(graph)
    }

    /// Number of memoized nodes.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }
}
