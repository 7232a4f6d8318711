//! petgraph-based transition graph of the element tree.
//!
//! Nodes are state-kind elements (the workflow root excluded); edges are
//! `transition` elements from their enclosing state to each resolved target.
//! Entering a compound state and completing a nested `final` are modelled as
//! implicit edges so reachability follows the interpreter's control flow.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::element::{ElementId, ElementTree};
use crate::registry::ElementTag;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// A `transition` with a guard.
    Conditional,
    /// A `transition` that fires as soon as its state is entered.
    Conditionless,
    /// Parent → first child state, nested final → parent.
    Implicit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEdge {
    pub kind: EdgeKind,
    /// The `transition` element, absent for implicit edges.
    pub transition: Option<ElementId>,
}

/// A `transition` target that names no known state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedTarget {
    pub transition: ElementId,
    pub source: ElementId,
    pub target: String,
}

pub struct TransitionGraph {
    pub graph: DiGraph<ElementId, TransitionEdge>,
    pub node_indices: HashMap<ElementId, NodeIndex>,
    /// State ids to every element declaring them, document order.
    pub ids: HashMap<String, Vec<ElementId>>,
    pub unresolved: Vec<UnresolvedTarget>,
}

impl TransitionGraph {
    pub fn build(tree: &ElementTree) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        let mut ids: HashMap<String, Vec<ElementId>> = HashMap::new();
        let mut unresolved = Vec::new();

        let attached = tree.attached();

        // Add all states
        for &id in &attached {
            let element = tree.get(id);
            if !element.is_state() || element.is_workflow() {
                continue;
            }
            node_indices.insert(id, graph.add_node(id));
            if let Some(state_id) = element.id() {
                ids.entry(state_id.to_string()).or_default().push(id);
            }
        }

        let mut this = TransitionGraph {
            graph,
            node_indices,
            ids,
            unresolved: Vec::new(),
        };

        // Add transitions and implicit edges
        for &id in &attached {
            let element = tree.get(id);
            if element.is_state() && !element.is_workflow() {
                this.add_implicit_edges(tree, id);
                continue;
            }
            if element.tag != ElementTag::Transition {
                continue;
            }
            let Some(source) = tree.parent(id).filter(|p| this.node_indices.contains_key(p)) else {
                continue;
            };
            let kind = if element.is_conditionless_transition() {
                EdgeKind::Conditionless
            } else {
                EdgeKind::Conditional
            };
            let Some(target) = element.attribute("target").and_then(|t| t.as_str()) else {
                continue;
            };
            for target in target.split_whitespace() {
                match this.resolve(tree, target, source) {
                    Some(target_id) => {
                        let (s, t) = (this.node_indices[&source], this.node_indices[&target_id]);
                        this.graph.add_edge(
                            s,
                            t,
                            TransitionEdge {
                                kind,
                                transition: Some(id),
                            },
                        );
                    }
                    None => unresolved.push(UnresolvedTarget {
                        transition: id,
                        source,
                        target: target.to_string(),
                    }),
                }
            }
        }

        this.unresolved = unresolved;
        this
    }

    fn add_implicit_edges(&mut self, tree: &ElementTree, state: ElementId) {
        let Some(&from) = self.node_indices.get(&state) else {
            return;
        };
        let initial = tree.get(state).attribute("initial").and_then(|v| v.as_str());
        let first_child = tree
            .state_children(state)
            .find(|c| initial.is_some() && tree.get(*c).id() == initial)
            .or_else(|| {
                tree.state_children(state)
                    .find(|c| tree.get(*c).tag != ElementTag::History)
            });
        if let Some(&to) = first_child.and_then(|c| self.node_indices.get(&c)) {
            self.graph.add_edge(
                from,
                to,
                TransitionEdge {
                    kind: EdgeKind::Implicit,
                    transition: None,
                },
            );
        }
        if tree.get(state).is_final() {
            if let Some(&parent) = tree.parent(state).and_then(|p| self.node_indices.get(&p)) {
                self.graph.add_edge(
                    from,
                    parent,
                    TransitionEdge {
                        kind: EdgeKind::Implicit,
                        transition: None,
                    },
                );
            }
        }
    }

    /// Resolve `target` as seen from `source`: among states declaring that
    /// id, the one sharing the longest scope prefix with `source` wins.
    fn resolve(&self, tree: &ElementTree, target: &str, source: ElementId) -> Option<ElementId> {
        let candidates = self.ids.get(target)?;
        let source_scope = &tree.get(source).scope;
        candidates.iter().copied().max_by_key(|c| {
            let scope = &tree.get(*c).scope;
            let shared = scope
                .iter()
                .zip(source_scope.iter())
                .take_while(|(a, b)| a == b)
                .count();
            // Earlier declarations win ties.
            (shared, std::cmp::Reverse(c.index()))
        })
    }

    pub fn index_of(&self, state: ElementId) -> Option<NodeIndex> {
        self.node_indices.get(&state).copied()
    }

    pub fn successors(&self, state: ElementId) -> Vec<(ElementId, &TransitionEdge)> {
        let Some(idx) = self.index_of(state) else {
            return vec![];
        };
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (self.graph[e.target()], e.weight()))
            .collect()
    }

    pub fn incoming_count(&self, state: ElementId) -> usize {
        let Some(idx) = self.index_of(state) else {
            return 0;
        };
        self.graph.edges_directed(idx, Direction::Incoming).count()
    }

    /// A copy containing only the edges accepted by `keep`.
    pub fn filtered(&self, keep: impl Fn(EdgeKind) -> bool) -> DiGraph<ElementId, ()> {
        self.graph
            .filter_map(|_, n| Some(*n), |_, e| keep(e.kind).then_some(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{AttributeValue, SerializedElement};
    use crate::parse::Span;

    fn add(tree: &mut ElementTree, tag: ElementTag, id: Option<&str>, parent: Option<ElementId>) -> ElementId {
        let key = tree.next_key();
        let mut element = SerializedElement::new(key, tag, vec![], Span::default());
        if let Some(id) = id {
            element = element.with_attribute("id", AttributeValue::string(id));
            element.scope = vec![id.to_string()];
        }
        tree.add(element, parent)
    }

    fn transition(tree: &mut ElementTree, from: ElementId, target: &str, cond: Option<&str>) -> ElementId {
        let t = add(tree, ElementTag::Transition, None, Some(from));
        tree.get_mut(t)
            .attributes
            .insert("target".into(), AttributeValue::string(target));
        if let Some(cond) = cond {
            tree.get_mut(t)
                .attributes
                .insert("cond".into(), AttributeValue::expression(cond));
        }
        t
    }

    #[test]
    fn edges_follow_transitions() {
        let mut tree = ElementTree::new();
        let root = add(&mut tree, ElementTag::Workflow, None, None);
        let a = add(&mut tree, ElementTag::State, Some("a"), Some(root));
        let b = add(&mut tree, ElementTag::State, Some("b"), Some(root));
        transition(&mut tree, a, "b", None);
        transition(&mut tree, b, "a", Some("x > 1"));
        transition(&mut tree, b, "nowhere", None);

        let graph = TransitionGraph::build(&tree);

        assert_eq!(graph.successors(a), vec![(b, &TransitionEdge {
            kind: EdgeKind::Conditionless,
            transition: Some(tree.children(a)[0]),
        })]);
        assert_eq!(graph.successors(b)[0].1.kind, EdgeKind::Conditional);
        assert_eq!(graph.incoming_count(a), 1);
        assert_eq!(graph.unresolved.len(), 1);
        assert_eq!(graph.unresolved[0].target, "nowhere");
    }

    #[test]
    fn compound_state_enters_first_child() {
        let mut tree = ElementTree::new();
        let root = add(&mut tree, ElementTag::Workflow, None, None);
        let outer = add(&mut tree, ElementTag::State, Some("outer"), Some(root));
        let inner = add(&mut tree, ElementTag::State, Some("inner"), Some(outer));

        let graph = TransitionGraph::build(&tree);
        let successors = graph.successors(outer);
        assert_eq!(successors.len(), 1);
        assert_eq!(successors[0].0, inner);
        assert_eq!(successors[0].1.kind, EdgeKind::Implicit);
    }
}
