//! Element tree node types.
//!
//! A `SerializedElement` is the typed, scope-tagged counterpart of a markup
//! element. Nodes live in an [`ElementTree`](super::ElementTree) arena and refer
//! to each other by [`ElementId`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::parse::Span;
use crate::registry::{ElementKind, ElementSubType, ElementTag};

/// Index of a node inside its `ElementTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    pub fn index(self) -> usize {
        self.0
    }
}

// =============================================================================
// ATTRIBUTE VALUES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "literalType", content = "value", rename_all = "camelCase")]
pub enum LiteralValue {
    String(String),
    Number(f64),
    Boolean(bool),
    Json(serde_json::Value),
}

/// A resolved attribute value. Expressions and functions are carried as raw
/// source; the runtime evaluates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum AttributeValue {
    Literal(LiteralValue),
    Expression(String),
    Function(String),
}

impl AttributeValue {
    pub fn string(s: impl Into<String>) -> Self {
        AttributeValue::Literal(LiteralValue::String(s.into()))
    }

    pub fn number(n: f64) -> Self {
        AttributeValue::Literal(LiteralValue::Number(n))
    }

    pub fn boolean(b: bool) -> Self {
        AttributeValue::Literal(LiteralValue::Boolean(b))
    }

    pub fn expression(source: impl Into<String>) -> Self {
        AttributeValue::Expression(source.into())
    }

    /// The literal string, if this is a string literal.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::Literal(LiteralValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Literal(LiteralValue::Boolean(b)) => Some(*b),
            AttributeValue::Literal(LiteralValue::String(s)) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, AttributeValue::Literal(_))
    }

    /// Source text of the value as the author wrote it.
    pub fn source_text(&self) -> String {
        match self {
            AttributeValue::Literal(LiteralValue::String(s)) => s.clone(),
            AttributeValue::Literal(LiteralValue::Number(n)) => n.to_string(),
            AttributeValue::Literal(LiteralValue::Boolean(b)) => b.to_string(),
            AttributeValue::Literal(LiteralValue::Json(v)) => v.to_string(),
            AttributeValue::Expression(s) | AttributeValue::Function(s) => s.clone(),
        }
    }
}

// =============================================================================
// ELEMENT
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct SerializedElement {
    /// Unique within one compilation.
    pub key: String,
    pub tag: ElementTag,
    pub kind: ElementKind,
    pub sub_type: Option<ElementSubType>,
    /// Enclosing state ids from the root. For a state this includes its own id.
    pub scope: Vec<String>,
    pub attributes: IndexMap<String, AttributeValue>,
    /// Declaration order; for sibling states this is transition priority.
    pub children: Vec<ElementId>,
    pub parent: Option<ElementId>,
    pub span: Span,
}

impl SerializedElement {
    /// A node with the registry's kind and sub-type for `tag`.
    pub fn new(key: String, tag: ElementTag, scope: Vec<String>, span: Span) -> Self {
        let definition = tag.definition();
        SerializedElement {
            key,
            tag,
            kind: definition.kind,
            sub_type: definition.sub_type,
            scope,
            attributes: IndexMap::new(),
            children: Vec::new(),
            parent: None,
            span,
        }
    }

    pub fn with_attribute(mut self, name: &str, value: AttributeValue) -> Self {
        self.attributes.insert(name.to_string(), value);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// The declared `id`, when it is a non-empty string literal.
    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
            .and_then(AttributeValue::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn is_state(&self) -> bool {
        self.kind == ElementKind::State
    }

    pub fn is_workflow(&self) -> bool {
        self.tag == ElementTag::Workflow
    }

    pub fn is_final(&self) -> bool {
        self.tag == ElementTag::Final || self.sub_type == Some(ElementSubType::Final)
    }

    /// A state declaring id `error`. Only one directly under the workflow
    /// root is the error pseudo-state; see
    /// [`ElementTree::is_error_pseudo_state`](super::ElementTree::is_error_pseudo_state).
    pub fn is_error_state(&self) -> bool {
        self.is_state() && self.id() == Some("error")
    }

    /// A `transition` without a guard.
    pub fn is_conditionless_transition(&self) -> bool {
        if self.tag != ElementTag::Transition {
            return false;
        }
        match self.attribute("cond") {
            None => true,
            Some(value) => value.source_text().trim().is_empty(),
        }
    }

    /// Character data carried by `#text` / `#expression` nodes.
    pub fn text_value(&self) -> Option<String> {
        if !self.tag.is_character_data() {
            return None;
        }
        self.attribute("value").map(AttributeValue::source_text)
    }
}
