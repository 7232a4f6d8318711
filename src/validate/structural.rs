//! Transition-graph structural rules (V005–V008).

use std::collections::{HashMap, HashSet};

use petgraph::algo::{is_cyclic_directed, tarjan_scc};
use petgraph::visit::{Bfs, Reversed};

use super::graph::{EdgeKind, TransitionGraph};
use crate::element::{ElementId, ElementTree};
use crate::error::{Diagnostic, Diagnostics, Severity};
use crate::registry::ElementTag;

/// Run all structural rules against `tree`.
pub fn validate_structural(tree: &ElementTree, diagnostics: &mut Diagnostics) {
    let graph = TransitionGraph::build(tree);
    log::debug!(
        states = graph.node_indices.len(),
        transitions = graph.graph.edge_count();
        "Built transition graph"
    );

    v005_targets_exist(tree, &graph, diagnostics);
    v006_unique_ids_per_scope(tree, diagnostics);
    v007_terminal_reachable(tree, &graph, diagnostics);
    v008_no_conditionless_cycles(tree, &graph, diagnostics);
}

fn v005_targets_exist(tree: &ElementTree, graph: &TransitionGraph, diagnostics: &mut Diagnostics) {
    for unresolved in &graph.unresolved {
        let transition = tree.get(unresolved.transition);
        diagnostics.push(Diagnostic::validate(
            Severity::Error,
            "V005",
            format!(
                "Transition in state '{}' targets unknown state '{}'",
                state_name(tree, unresolved.source),
                unresolved.target
            ),
            transition.span,
        ));
    }
}

fn v006_unique_ids_per_scope(tree: &ElementTree, diagnostics: &mut Diagnostics) {
    let mut seen: HashMap<&[String], ElementId> = HashMap::new();
    for id in tree.attached() {
        let element = tree.get(id);
        if !element.is_state() || element.is_workflow() {
            continue;
        }
        if let Some(first) = seen.get(element.scope.as_slice()) {
            diagnostics.push(Diagnostic::validate(
                Severity::Error,
                "V006",
                format!(
                    "State id '{}' at line {} is already declared at line {}",
                    state_name(tree, id),
                    element.span.start.line,
                    tree.get(*first).span.start.line
                ),
                element.span,
            ));
        } else {
            seen.insert(element.scope.as_slice(), id);
        }
    }
}

fn v007_terminal_reachable(tree: &ElementTree, graph: &TransitionGraph, diagnostics: &mut Diagnostics) {
    let Some(root) = tree.workflow_root() else {
        return;
    };
    let terminals: Vec<ElementId> = tree
        .state_children(root)
        .filter(|c| {
            let state = tree.get(*c);
            state.is_final() || state.is_error_state()
        })
        .collect();

    let flow = graph.filtered(|kind| kind != EdgeKind::Conditional);
    let reversed = Reversed(&flow);
    let mut reaches_terminal = HashSet::new();
    for terminal in terminals {
        let Some(start) = graph.index_of(terminal) else {
            continue;
        };
        let mut bfs = Bfs::new(reversed, start);
        while let Some(nx) = bfs.next(reversed) {
            reaches_terminal.insert(flow[nx]);
        }
    }

    for &state in graph.graph.node_weights() {
        let element = tree.get(state);
        if element.is_final() || tree.is_error_pseudo_state(state) || element.tag == ElementTag::History {
            continue;
        }
        if !reaches_terminal.contains(&state) {
            diagnostics.push(Diagnostic::validate(
                Severity::Warning,
                "V007",
                format!(
                    "State '{}' cannot reach a final or error state without a condition",
                    state_name(tree, state)
                ),
                element.span,
            ));
        }
    }
}

fn v008_no_conditionless_cycles(tree: &ElementTree, graph: &TransitionGraph, diagnostics: &mut Diagnostics) {
    let conditionless = graph.filtered(|kind| kind == EdgeKind::Conditionless);
    if !is_cyclic_directed(&conditionless) {
        return;
    }

    for component in tarjan_scc(&conditionless) {
        let is_cycle = component.len() > 1
            || component
                .first()
                .is_some_and(|n| conditionless.contains_edge(*n, *n));
        if !is_cycle {
            continue;
        }
        let mut states: Vec<ElementId> = component.iter().map(|n| conditionless[*n]).collect();
        states.sort();
        let names: Vec<String> = states.iter().map(|s| state_name(tree, *s)).collect();
        diagnostics.push(Diagnostic::validate(
            Severity::Warning,
            "V008",
            format!("Conditionless transitions form a cycle: {}", names.join(" -> ")),
            tree.get(states[0]).span,
        ));
    }
}

fn state_name(tree: &ElementTree, state: ElementId) -> String {
    tree.get(state).id().unwrap_or("<anonymous>").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{AttributeValue, SerializedElement};
    use crate::parse::Span;

    struct Builder {
        tree: ElementTree,
        root: ElementId,
    }

    impl Builder {
        fn new() -> Self {
            let mut tree = ElementTree::new();
            let key = tree.next_key();
            let root = tree.add(SerializedElement::new(key, ElementTag::Workflow, vec![], Span::default()), None);
            Builder { tree, root }
        }

        fn state(&mut self, tag: ElementTag, id: &str) -> ElementId {
            let key = self.tree.next_key();
            let element = SerializedElement::new(key, tag, vec![id.into()], Span::default())
                .with_attribute("id", AttributeValue::string(id));
            self.tree.add(element, Some(self.root))
        }

        fn nested(&mut self, parent: ElementId, id: &str) -> ElementId {
            let key = self.tree.next_key();
            let mut scope = self.tree.get(parent).scope.clone();
            scope.push(id.into());
            let element = SerializedElement::new(key, ElementTag::State, scope, Span::default())
                .with_attribute("id", AttributeValue::string(id));
            self.tree.add(element, Some(parent))
        }

        fn go(&mut self, from: ElementId, target: &str) {
            let key = self.tree.next_key();
            let element = SerializedElement::new(key, ElementTag::Transition, vec![], Span::default())
                .with_attribute("target", AttributeValue::string(target));
            self.tree.add(element, Some(from));
        }

        fn run(&self) -> Diagnostics {
            let mut diagnostics = Diagnostics::new();
            validate_structural(&self.tree, &mut diagnostics);
            diagnostics
        }
    }

    #[test]
    fn healthy_chain_is_clean() {
        let mut b = Builder::new();
        let s1 = b.state(ElementTag::State, "s1");
        let s2 = b.state(ElementTag::State, "s2");
        b.state(ElementTag::Final, "final");
        b.state(ElementTag::State, "error");
        b.go(s1, "s2");
        b.go(s2, "final");

        assert!(b.run().is_empty());
    }

    #[test]
    fn unknown_target_is_an_error() {
        let mut b = Builder::new();
        let s1 = b.state(ElementTag::State, "s1");
        b.state(ElementTag::Final, "final");
        b.go(s1, "missing");

        let diagnostics = b.run();
        assert_eq!(diagnostics.with_code("V005").count(), 1);
        assert_eq!(diagnostics.with_code("V007").count(), 1);
    }

    #[test]
    fn duplicate_ids_in_same_scope() {
        let mut b = Builder::new();
        let a = b.state(ElementTag::State, "a");
        let a2 = b.state(ElementTag::State, "a");
        b.state(ElementTag::Final, "final");
        b.go(a, "final");
        b.go(a2, "final");

        let diagnostics = b.run();
        assert_eq!(diagnostics.with_code("V006").count(), 1);
    }

    #[test]
    fn conditionless_cycle_warns() {
        let mut b = Builder::new();
        let a = b.state(ElementTag::State, "a");
        let c = b.state(ElementTag::State, "c");
        b.state(ElementTag::Final, "final");
        b.go(a, "c");
        b.go(c, "a");

        let diagnostics = b.run();
        let cycle: Vec<_> = diagnostics.with_code("V008").collect();
        assert_eq!(cycle.len(), 1);
        assert!(cycle[0].message.contains("a -> c"));
        assert_eq!(diagnostics.with_code("V007").count(), 2);
    }

    #[test]
    fn nested_error_state_is_not_a_terminal() {
        let mut b = Builder::new();
        let outer = b.state(ElementTag::State, "outer");
        let a = b.nested(outer, "a");
        b.nested(outer, "error");
        b.state(ElementTag::Final, "final");
        b.state(ElementTag::State, "error");
        b.go(outer, "final");
        b.go(a, "error");

        let diagnostics = b.run();
        let stuck: Vec<_> = diagnostics.with_code("V007").map(|d| d.message.clone()).collect();
        assert_eq!(stuck.len(), 2, "{stuck:?}");
        assert!(stuck.iter().any(|m| m.contains("'error'")));
        assert!(stuck.iter().any(|m| m.contains("'a'")));
    }
}
