//! Sibling chaining.
//!
//! Each chainable state without a conditionless transition gets one to the
//! next chainable sibling in declaration order. The last sibling falls back
//! to the container's own `final` child, or else to wherever the container
//! itself goes next. Regions of a `parallel` are not chained among
//! themselves; they inherit the parallel's exit target, and a region with
//! no chainable states of its own transitions there directly.

use log::trace;

use crate::element::{AttributeValue, ElementId, ElementTree, SerializedElement};
use crate::registry::{ElementSubType, ElementTag};

/// Chain every level below `root`. Returns the number of transitions added.
pub fn chain_states(tree: &mut ElementTree, root: ElementId) -> usize {
    let exit = super::root_final_id(tree);
    chain_container(tree, root, &exit)
}

/// Whether `state` takes part in sibling chaining.
pub fn is_chainable(tree: &ElementTree, state: ElementId) -> bool {
    let element = tree.get(state);
    element.is_state()
        && !element.is_final()
        && !tree.is_error_pseudo_state(state)
        && element.tag != ElementTag::History
        && element.sub_type != Some(ElementSubType::Error)
}

fn chain_container(tree: &mut ElementTree, container: ElementId, exit: &str) -> usize {
    let fallback = own_final_id(tree, container).unwrap_or_else(|| exit.to_string());
    let states: Vec<ElementId> = tree
        .state_children(container)
        .filter(|s| is_chainable(tree, *s))
        .collect();

    let mut added = 0;
    if tree.get(container).tag == ElementTag::Parallel {
        for region in states {
            // A region with nothing to chain completes straight to the exit.
            let has_chainable = tree.state_children(region).any(|s| is_chainable(tree, s));
            if !has_chainable && !tree.has_conditionless_transition(region) {
                add_transition(tree, region, &fallback);
                added += 1;
            }
            added += chain_container(tree, region, &fallback);
        }
        return added;
    }

    for (i, &state) in states.iter().enumerate() {
        let next = match states.get(i + 1) {
            Some(&sibling) => tree.get(sibling).id().unwrap_or_default().to_string(),
            None => fallback.clone(),
        };
        if next.is_empty() {
            continue;
        }
        if !tree.has_conditionless_transition(state) {
            add_transition(tree, state, &next);
            added += 1;
        }
        added += chain_container(tree, state, &next);
    }
    added
}

fn own_final_id(tree: &ElementTree, container: ElementId) -> Option<String> {
    tree.state_children(container)
        .find(|c| tree.get(*c).is_final())
        .and_then(|f| tree.get(f).id().map(str::to_string))
}

fn add_transition(tree: &mut ElementTree, state: ElementId, target: &str) {
    let scope = tree.get(state).scope.clone();
    let key = tree.next_key();
    let transition = SerializedElement::new(key, ElementTag::Transition, scope, Default::default())
        .with_attribute("target", AttributeValue::string(target));
    trace!(
        state = tree.get(state).id().unwrap_or_default(),
        target = target;
        "Added fallback transition"
    );
    tree.add(transition, Some(state));
}
