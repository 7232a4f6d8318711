//! Syntax attribute values → `AttributeValue`.
//!
//! Runtime-evaluated values are split out here so the interpreter never has to
//! sniff strings: `${...}` templates become expressions, and function sources
//! (including the legacy `::FUNCTION-EXPRESSION::` prefix) become functions.

use indexmap::IndexMap;

use super::TransformError;
use crate::element::{AttributeValue, LiteralValue};
use crate::parse::{ElementNode, SyntaxAttributeValue};

const FUNCTION_PREFIX: &str = "::FUNCTION-EXPRESSION::";

pub(super) fn convert_attributes(
    node: &ElementNode,
) -> Result<IndexMap<String, AttributeValue>, TransformError> {
    let mut out = IndexMap::new();
    for attribute in &node.attributes {
        if out.contains_key(&attribute.name) {
            return Err(TransformError::DuplicateAttribute {
                name: attribute.name.clone(),
            });
        }
        out.insert(attribute.name.clone(), convert_value(&attribute.value));
    }
    Ok(out)
}

pub(super) fn convert_value(value: &SyntaxAttributeValue) -> AttributeValue {
    match value {
        SyntaxAttributeValue::Literal { value } => json_value(value),
        SyntaxAttributeValue::Expression { source } => expression_value(source),
    }
}

pub(super) fn json_value(value: &serde_json::Value) -> AttributeValue {
    match value {
        serde_json::Value::String(s) => string_value(s),
        serde_json::Value::Bool(b) => AttributeValue::boolean(*b),
        serde_json::Value::Number(n) => match n.as_f64() {
            Some(f) => AttributeValue::number(f),
            None => AttributeValue::Literal(LiteralValue::Json(value.clone())),
        },
        serde_json::Value::Null => AttributeValue::string(""),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            AttributeValue::Literal(LiteralValue::Json(value.clone()))
        }
    }
}

fn string_value(s: &str) -> AttributeValue {
    if let Some(source) = s.strip_prefix(FUNCTION_PREFIX) {
        return AttributeValue::Function(source.trim().to_string());
    }
    if s.contains("${") {
        // Evaluated as a template literal at run time.
        return AttributeValue::Expression(format!("`{}`", s.replace('`', "\\`")));
    }
    AttributeValue::string(s)
}

pub(super) fn expression_value(source: &str) -> AttributeValue {
    let trimmed = source.trim();
    if looks_like_function(trimmed) {
        AttributeValue::Function(trimmed.to_string())
    } else {
        AttributeValue::Expression(trimmed.to_string())
    }
}

fn looks_like_function(source: &str) -> bool {
    if source.starts_with("function") || source.starts_with("async ") {
        return true;
    }
    let Some(arrow) = source.find("=>") else {
        return false;
    };
    let head = source[..arrow].trim();
    (head.starts_with('(') && head.ends_with(')'))
        || (!head.is_empty() && head.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$'))
}
