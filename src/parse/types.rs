//! Rust types mirroring the syntax tree emitted by the markup parser.
//!
//! These types are the serde target for the parser's JSON output. The core
//! only reads them; it never builds or mutates a syntax tree.

use serde::{Deserialize, Serialize};

// =============================================================================
// SOURCE POSITIONS
// =============================================================================

/// A source location: 1-based `line`, 0-based `column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        Span { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

// =============================================================================
// SYNTAX NODES
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SyntaxNode {
    Root(RootNode),
    Element(ElementNode),
    Text(TextNode),
    Expression(ExpressionNode),
    FrontmatterField(FrontmatterField),
    Import(ImportNode),
    Comment(CommentNode),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootNode {
    #[serde(default)]
    pub children: Vec<SyntaxNode>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementNode {
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<SyntaxAttribute>,
    #[serde(default)]
    pub children: Vec<SyntaxNode>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyntaxAttribute {
    pub name: String,
    pub value: SyntaxAttributeValue,
}

/// An attribute value as written by the author: either a literal
/// (`id="s1"`, `temperature={0.2}` after constant folding by the parser) or an
/// expression that must be evaluated at run time (`cond={count > 2}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SyntaxAttributeValue {
    Literal { value: serde_json::Value },
    Expression { source: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextNode {
    pub value: String,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionNode {
    pub source: String,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontmatterField {
    pub key: String,
    pub value: serde_json::Value,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportNode {
    pub source: String,
    #[serde(default)]
    pub default_binding: Option<String>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentNode {
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub span: Span,
}

impl SyntaxNode {
    pub fn span(&self) -> Span {
        match self {
            SyntaxNode::Root(n) => n.span,
            SyntaxNode::Element(n) => n.span,
            SyntaxNode::Text(n) => n.span,
            SyntaxNode::Expression(n) => n.span,
            SyntaxNode::FrontmatterField(n) => n.span,
            SyntaxNode::Import(n) => n.span,
            SyntaxNode::Comment(n) => n.span,
        }
    }

    pub fn node_type(&self) -> &'static str {
        match self {
            SyntaxNode::Root(_) => "root",
            SyntaxNode::Element(_) => "element",
            SyntaxNode::Text(_) => "text",
            SyntaxNode::Expression(_) => "expression",
            SyntaxNode::FrontmatterField(_) => "frontmatterField",
            SyntaxNode::Import(_) => "import",
            SyntaxNode::Comment(_) => "comment",
        }
    }

    /// Top-level children of a document. A bare non-root node is treated as a
    /// document containing only that node.
    pub fn document_children(&self) -> &[SyntaxNode] {
        match self {
            SyntaxNode::Root(n) => &n.children,
            other => std::slice::from_ref(other),
        }
    }
}

impl ElementNode {
    pub fn attribute(&self, name: &str) -> Option<&SyntaxAttributeValue> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.value)
    }
}
