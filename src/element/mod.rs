//! Typed, scope-tagged element tree produced by the transformer and repaired
//! by the healer.

pub mod tree;
pub mod types;

pub use tree::{ElementSnapshot, ElementTree, KeySequence};
pub use types::*;
