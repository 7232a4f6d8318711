//! Validation passes over the element tree.
//!
//! Attribute validation checks every node against its registry definition and
//! runs before healing. Structural validation builds the transition graph of
//! the healed tree. Neither pass removes nodes.

pub mod attributes;
pub mod graph;
pub mod structural;

use crate::element::ElementTree;
use crate::error::Diagnostics;

pub use graph::TransitionGraph;

/// Run both passes and collect their findings.
pub fn validate_tree(tree: &ElementTree) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();
    attributes::validate_attributes(tree, &mut diagnostics);
    structural::validate_structural(tree, &mut diagnostics);
    diagnostics
}
