//! `data` element → `FieldDefinition`.

use serde_json::Value;

use super::Transformer;
use super::text::collect_text;
use crate::datamodel::validate::compile_schema;
use crate::datamodel::{FieldDefinition, FieldType, ScopePath};
use crate::element::{AttributeValue, ElementId, LiteralValue};
use crate::error::{Diagnostic, Severity};
use crate::parse::ElementNode;

/// Register the field declared by the `data` element `id` under the current
/// scope path.
pub(super) fn register_field(t: &mut Transformer<'_>, id: ElementId, node: &ElementNode) {
    let element = t.tree.get(id);
    let span = element.span;

    let Some(name) = element.id().map(str::to_string) else {
        t.diagnostics.push(Diagnostic::transform(
            Severity::Error,
            "T005",
            format!("<data> at line {} has no id; the field was not registered", span.start.line),
            span,
        ));
        return;
    };

    let readonly = element.attribute("readonly").and_then(AttributeValue::as_bool).unwrap_or(false);
    let from_request = element
        .attribute("fromRequest")
        .and_then(AttributeValue::as_bool)
        .unwrap_or(false);
    let schema_attr = element.attribute("schema").cloned();
    let type_attr = element.attribute("type").cloned();
    let expr_attr = element.attribute("expr").cloned();

    let schema = schema_attr.and_then(|attr| match attr {
        AttributeValue::Literal(LiteralValue::Json(v)) => Some(v),
        AttributeValue::Literal(LiteralValue::String(s)) => match serde_json::from_str(&s) {
            Ok(v) => Some(v),
            Err(e) => {
                t.diagnostics.push(Diagnostic::transform(
                    Severity::Error,
                    "T005",
                    format!("Schema of data field '{}' is not valid JSON: {}", name, e),
                    span,
                ));
                None
            }
        },
        _ => None,
    });

    let field_type = match type_attr {
        Some(attr) => {
            let raw = attr.source_text();
            FieldType::from_name(&raw).unwrap_or_else(|| {
                t.diagnostics.push(Diagnostic::transform(
                    Severity::Warning,
                    "T003",
                    format!("Unknown type '{}' for data field '{}', using string", raw, name),
                    span,
                ));
                FieldType::String
            })
        }
        None => infer_type(expr_attr.as_ref(), schema.is_some()),
    };

    let raw_default = collect_text(&node.children)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());
    let default_value = match (raw_default, expr_attr) {
        (Some(text), _) => Some(coerce_or_warn(t, &name, &text, field_type, span)),
        (None, Some(AttributeValue::Literal(literal))) => Some(literal_default(t, &name, literal, field_type, span)),
        _ => None,
    };

    let mut definition = FieldDefinition {
        field_type,
        readonly,
        from_request,
        default_value,
        schema,
    };
    if let Err(e) = compile_schema(&name, &definition) {
        t.diagnostics.push(Diagnostic::transform(Severity::Error, "T005", e.to_string(), span));
        definition.schema = None;
    }

    let scope = ScopePath::from(t.scope.as_slice());
    log::trace!(scope:% = scope, field = name.as_str(); "Registered data field");
    t.datamodel.entry(scope).or_default().insert(name, definition);
}

fn infer_type(expr: Option<&AttributeValue>, has_schema: bool) -> FieldType {
    match expr {
        Some(AttributeValue::Literal(LiteralValue::Number(_))) => FieldType::Number,
        Some(AttributeValue::Literal(LiteralValue::Boolean(_))) => FieldType::Boolean,
        Some(AttributeValue::Literal(LiteralValue::Json(_))) => FieldType::Json,
        _ if has_schema => FieldType::Json,
        _ => FieldType::String,
    }
}

fn literal_default(
    t: &mut Transformer<'_>,
    name: &str,
    literal: LiteralValue,
    field_type: FieldType,
    span: crate::parse::Span,
) -> Value {
    match (literal, field_type) {
        (LiteralValue::String(s), ty) => coerce_or_warn(t, name, &s, ty, span),
        (LiteralValue::Number(n), FieldType::Number | FieldType::Json) => number(n),
        (LiteralValue::Boolean(b), FieldType::Boolean | FieldType::Json) => Value::Bool(b),
        (LiteralValue::Json(v), FieldType::Json) => v,
        (LiteralValue::Number(n), ty) => coerce_or_warn(t, name, &n.to_string(), ty, span),
        (LiteralValue::Boolean(b), ty) => coerce_or_warn(t, name, &b.to_string(), ty, span),
        (LiteralValue::Json(v), ty) => coerce_or_warn(t, name, &v.to_string(), ty, span),
    }
}

fn coerce_or_warn(
    t: &mut Transformer<'_>,
    name: &str,
    raw: &str,
    field_type: FieldType,
    span: crate::parse::Span,
) -> Value {
    coerce(raw, field_type).unwrap_or_else(|reason| {
        t.diagnostics.push(Diagnostic::transform(
            Severity::Warning,
            "T003",
            format!(
                "Default value of data field '{}' is not a valid {}: {}; keeping the raw string",
                name, field_type, reason
            ),
            span,
        ));
        Value::String(raw.to_string())
    })
}

/// Convert the raw default text of a field to its declared type.
pub fn coerce(raw: &str, field_type: FieldType) -> Result<Value, String> {
    match field_type {
        FieldType::String => Ok(Value::String(raw.to_string())),
        FieldType::Number => {
            let parsed: f64 = raw
                .trim()
                .parse()
                .map_err(|_| format!("'{}' is not numeric", raw.trim()))?;
            if parsed.is_nan() || parsed.is_infinite() {
                return Err(format!("'{}' is not a finite number", raw.trim()));
            }
            Ok(number(parsed))
        }
        FieldType::Boolean => match raw.trim() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            other => Err(format!("'{}' is neither true nor false", other)),
        },
        FieldType::Json => serde_json::from_str(raw).map_err(|e| e.to_string()),
    }
}

fn number(n: f64) -> Value {
    serde_json::Number::from_f64(n)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn coerces_declared_types() {
        assert_eq!(coerce("42", FieldType::Number).unwrap(), json!(42.0));
        assert_eq!(coerce(" true ", FieldType::Boolean).unwrap(), json!(true));
        assert_eq!(coerce(r#"{"a": 1}"#, FieldType::Json).unwrap(), json!({"a": 1}));
        assert_eq!(coerce("plain", FieldType::String).unwrap(), json!("plain"));
    }

    #[test]
    fn rejects_nan_and_garbage() {
        assert!(coerce("NaN", FieldType::Number).is_err());
        assert!(coerce("abc", FieldType::Number).is_err());
        assert!(coerce("yes", FieldType::Boolean).is_err());
        assert!(coerce("{oops", FieldType::Json).is_err());
    }
}
