//! Property tests for healing: idempotence and guaranteed termination paths.

#[allow(dead_code)]
mod helpers;

use flowmark::element::ElementTree;
use flowmark::error::Diagnostics;
use flowmark::heal;
use flowmark::parse::SyntaxNode;
use helpers::*;
use proptest::prelude::*;

// ===================
// Strategies
// ===================

/// A state with optional children and an optional guarded transition. The
/// guard index is taken modulo the number of states when rendering. A shape
/// with children may render as a `parallel`, its children becoming regions.
#[derive(Debug, Clone)]
struct Shape {
    children: Vec<Shape>,
    guard: Option<usize>,
    parallel: bool,
}

fn shape_strategy() -> impl Strategy<Value = Shape> {
    let leaf = proptest::option::of(0usize..64).prop_map(|guard| Shape {
        children: vec![],
        guard,
        parallel: false,
    });
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            prop::collection::vec(inner, 1..4),
            proptest::option::of(0usize..64),
            proptest::bool::weighted(0.3),
        )
            .prop_map(|(children, guard, parallel)| Shape {
                children,
                guard,
                parallel,
            })
    })
}

fn workflow_strategy() -> impl Strategy<Value = Vec<Shape>> {
    prop::collection::vec(shape_strategy(), 1..5)
}

fn count(shapes: &[Shape]) -> usize {
    shapes.iter().map(|s| 1 + count(&s.children)).sum()
}

/// Render with pre-order ids `s0`, `s1`, ...
fn render(shapes: &[Shape], next: &mut usize, total: usize) -> Vec<SyntaxNode> {
    shapes
        .iter()
        .map(|shape| {
            let id = format!("s{}", *next);
            *next += 1;
            let mut children = Vec::new();
            if let Some(guard) = shape.guard {
                children.push(transition(&format!("s{}", guard % total), Some("ready")));
            }
            children.extend(render(&shape.children, next, total));
            if shape.parallel {
                el("parallel", vec![lit("id", id.as_str())], children)
            } else {
                state(&id, children)
            }
        })
        .collect()
}

fn document(shapes: &[Shape]) -> (SyntaxNode, usize) {
    let total = count(shapes);
    let mut next = 0;
    (doc(vec![workflow(render(shapes, &mut next, total))]), total)
}

/// Where control goes from `id` without a guard: its first conditionless
/// transition, or else its first child state.
fn next_hop(tree: &ElementTree, id: &str) -> Option<String> {
    let state = find(tree, id)?;
    let transition = tree
        .children(state)
        .iter()
        .map(|c| tree.get(*c))
        .find(|c| c.is_conditionless_transition())
        .and_then(|c| c.attribute("target"))
        .map(|t| t.source_text());
    transition.or_else(|| {
        tree.state_children(state)
            .next()
            .and_then(|c| tree.get(c).id().map(str::to_string))
    })
}

// ===================
// Property Test Functions
// ===================

fn check_heal_is_idempotent(shapes: &[Shape]) -> Result<(), TestCaseError> {
    let (root, _) = document(shapes);
    let mut compilation = compile(&root);
    let before = compilation.tree.outline();

    let mut diagnostics = Diagnostics::new();
    let summary = heal::heal(&mut compilation.tree, &mut diagnostics);

    prop_assert!(summary.is_noop(), "second heal changed the tree: {summary:?}");
    prop_assert_eq!(compilation.tree.outline(), before);
    Ok(())
}

fn check_healed_tree_is_structurally_clean(shapes: &[Shape]) -> Result<(), TestCaseError> {
    let (root, _) = document(shapes);
    let compilation = compile(&root);

    for code in ["V005", "V006", "V007", "V008"] {
        let found: Vec<_> = compilation.diagnostics.with_code(code).map(|d| d.message.clone()).collect();
        prop_assert!(found.is_empty(), "unexpected {code}: {found:?}");
    }
    prop_assert!(!compilation.has_errors());
    Ok(())
}

fn check_every_state_reaches_final(shapes: &[Shape]) -> Result<(), TestCaseError> {
    let (root, total) = document(shapes);
    let compilation = compile(&root);
    let tree = &compilation.tree;

    let workflow = tree.workflow_root().unwrap();
    let ids = state_ids(tree, workflow);
    prop_assert_eq!(&ids[ids.len() - 2..], ["final", "error"]);

    for i in 0..total {
        let mut current = format!("s{i}");
        let mut reached = false;
        for _ in 0..=2 * total + 1 {
            if current == "final" {
                reached = true;
                break;
            }
            match next_hop(tree, &current) {
                Some(next) => current = next,
                None => break,
            }
        }
        prop_assert!(reached, "s{i} does not reach final without a condition, stopped at {current}");
    }
    Ok(())
}

// ===================
// Proptest Wrappers
// ===================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn heal_is_idempotent(shapes in workflow_strategy()) {
        check_heal_is_idempotent(&shapes)?;
    }

    #[test]
    fn healed_tree_is_structurally_clean(shapes in workflow_strategy()) {
        check_healed_tree_is_structurally_clean(&shapes)?;
    }

    #[test]
    fn every_state_reaches_final(shapes in workflow_strategy()) {
        check_every_state_reaches_final(&shapes)?;
    }
}
