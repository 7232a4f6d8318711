//! Heal phase: rewrite the transformed tree into an executable state machine.
//!
//! Steps run in a fixed order:
//! 1. [`pseudo`]: make sure the root owns a `final` and an `error` state.
//! 2. [`wrap`]: wrap bare root actions in synthesized states.
//! 3. [`chain`]: give every state that lacks one a conditionless transition
//!    to the next state in declaration order, recursively.
//! 4. [`order`]: stable-sort the root's children.
//!
//! Every step only adds what is missing, so healing a healed tree is a no-op.

pub mod chain;
pub mod order;
pub mod pseudo;
pub mod wrap;

use log::{debug, info};
use serde::Serialize;

use crate::element::ElementTree;
use crate::error::Diagnostics;

/// Counts of the repairs one healing pass made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealSummary {
    pub pseudo_states: usize,
    pub wrapped: usize,
    pub transitions: usize,
    pub reordered: bool,
}

impl HealSummary {
    pub fn is_noop(&self) -> bool {
        *self == HealSummary::default()
    }
}

/// Heal `tree` in place. A tree without a workflow root is left untouched.
pub fn heal(tree: &mut ElementTree, diagnostics: &mut Diagnostics) -> HealSummary {
    let Some(root) = tree.workflow_root() else {
        debug!("No workflow root; skipping heal");
        return HealSummary::default();
    };
    info!(elements = tree.len(); "Healing element tree");

    let mut summary = HealSummary {
        pseudo_states: pseudo::ensure_pseudo_states(tree, root, diagnostics),
        wrapped: wrap::wrap_root_actions(tree, root, diagnostics),
        ..HealSummary::default()
    };
    summary.transitions = chain::chain_states(tree, root);
    summary.reordered = order::sort_root_children(tree, root);

    debug!(
        pseudo_states = summary.pseudo_states,
        wrapped = summary.wrapped,
        transitions = summary.transitions,
        reordered = summary.reordered;
        "Heal complete"
    );
    summary
}

/// Id of the root's final state, `"final"` when it has none yet.
pub fn root_final_id(tree: &ElementTree) -> String {
    tree.workflow_root()
        .and_then(|root| tree.state_children(root).find(|c| tree.get(*c).is_final()))
        .and_then(|f| tree.get(f).id().map(str::to_string))
        .unwrap_or_else(|| pseudo::FINAL_ID.to_string())
}
