//! Parse phase: syntax-tree JSON → Rust types.
//!
//! The markup tokenizer lives outside this crate; it hands us its tree as JSON.

pub mod types;

pub use types::*;

use crate::error::Diagnostic;

/// Deserialize a syntax tree JSON string into a `SyntaxNode`.
pub fn parse(json: &str) -> Result<SyntaxNode, Vec<Diagnostic>> {
    serde_json::from_str::<SyntaxNode>(json).map_err(|e| {
        vec![Diagnostic::parse(
            "P001",
            format!("Failed to parse syntax tree JSON: {}", e),
        )]
    })
}
