//! Per-element attribute and child validation (V001–V004).
//! The rules read the registry; keep them in step with `registry::definitions`.

use crate::element::{AttributeValue, ElementId, ElementTree, LiteralValue, SerializedElement};
use crate::error::{Diagnostic, Diagnostics, Severity};
use crate::registry::{AttributeSpec, AttributeType};

/// Validate every attached element. Returns the number of findings added.
pub fn validate_attributes(tree: &ElementTree, diagnostics: &mut Diagnostics) -> usize {
    let before = diagnostics.len();
    for id in tree.attached() {
        validate_element(tree, id, diagnostics);
    }
    let added = diagnostics.len() - before;
    log::debug!(findings = added; "Attribute validation complete");
    added
}

fn validate_element(tree: &ElementTree, id: ElementId, diagnostics: &mut Diagnostics) {
    let element = tree.get(id);

    v001_required_attributes(element, diagnostics);
    // Frontmatter lands on the workflow root, so its attribute set is open.
    if !element.is_workflow() {
        v002_unknown_attributes(element, diagnostics);
    }
    v003_attribute_types(element, diagnostics);
    v004_allowed_children(tree, element, diagnostics);
}

fn v001_required_attributes(element: &SerializedElement, diagnostics: &mut Diagnostics) {
    for name in element.tag.definition().required_attributes() {
        if element.attribute(name).is_none() {
            diagnostics.push(Diagnostic::validate(
                Severity::Error,
                "V001",
                format!(
                    "<{}> at line {} is missing required attribute '{}'",
                    element.tag, element.span.start.line, name
                ),
                element.span,
            ));
        }
    }
}

fn v002_unknown_attributes(element: &SerializedElement, diagnostics: &mut Diagnostics) {
    let definition = element.tag.definition();
    for name in element.attributes.keys() {
        if definition.attribute(name).is_none() {
            diagnostics.push(Diagnostic::validate(
                Severity::Warning,
                "V002",
                format!(
                    "<{}> at line {} has unknown attribute '{}'",
                    element.tag, element.span.start.line, name
                ),
                element.span,
            ));
        }
    }
}

fn v003_attribute_types(element: &SerializedElement, diagnostics: &mut Diagnostics) {
    let definition = element.tag.definition();
    for (name, value) in &element.attributes {
        let Some(spec) = definition.attribute(name) else {
            continue;
        };
        if let Err(reason) = check_type(spec, value) {
            diagnostics.push(Diagnostic::validate(
                Severity::Warning,
                "V003",
                format!(
                    "Attribute '{}' of <{}> at line {} {}",
                    name, element.tag, element.span.start.line, reason
                ),
                element.span,
            ));
        }
    }
}

fn v004_allowed_children(tree: &ElementTree, element: &SerializedElement, diagnostics: &mut Diagnostics) {
    let definition = element.tag.definition();
    for child in &element.children {
        let child = tree.get(*child);
        if !definition.allows_child(child.tag) {
            diagnostics.push(Diagnostic::validate(
                Severity::Warning,
                "V004",
                format!(
                    "<{}> is not allowed inside <{}> (line {})",
                    child.tag, element.tag, child.span.start.line
                ),
                child.span,
            ));
        }
    }
}

/// Expressions and functions are evaluated at runtime and pass any type.
fn check_type(spec: &AttributeSpec, value: &AttributeValue) -> Result<(), String> {
    let AttributeValue::Literal(literal) = value else {
        return match spec.ty {
            AttributeType::Enum(_) => Err("must be a literal, not an expression".to_string()),
            _ => Ok(()),
        };
    };

    match (spec.ty, literal) {
        (AttributeType::String | AttributeType::Expression, LiteralValue::Json(_)) => {
            Err("expects text, found a JSON value".to_string())
        }
        (AttributeType::String | AttributeType::Expression, _) => Ok(()),
        (AttributeType::Number, LiteralValue::Number(_)) => Ok(()),
        (AttributeType::Number, LiteralValue::String(s)) if s.trim().parse::<f64>().is_ok() => Ok(()),
        (AttributeType::Number, other) => Err(format!("expects a number, found {}", describe(other))),
        (AttributeType::Boolean, LiteralValue::Boolean(_)) => Ok(()),
        (AttributeType::Boolean, LiteralValue::String(s)) if s == "true" || s == "false" => Ok(()),
        (AttributeType::Boolean, other) => Err(format!("expects a boolean, found {}", describe(other))),
        (AttributeType::Json, LiteralValue::Json(_)) => Ok(()),
        (AttributeType::Json, LiteralValue::String(s)) => serde_json::from_str::<serde_json::Value>(s)
            .map(|_| ())
            .map_err(|e| format!("is not valid JSON: {}", e)),
        (AttributeType::Json, _) => Ok(()),
        (AttributeType::Enum(allowed), LiteralValue::String(s)) if allowed.contains(&s.as_str()) => Ok(()),
        (AttributeType::Enum(allowed), other) => Err(format!(
            "has value {} but expects one of: {}",
            describe(other),
            allowed.join(", ")
        )),
    }
}

fn describe(literal: &LiteralValue) -> String {
    match literal {
        LiteralValue::String(s) => format!("'{}'", s),
        LiteralValue::Number(n) => n.to_string(),
        LiteralValue::Boolean(b) => b.to_string(),
        LiteralValue::Json(v) => v.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::Span;
    use crate::registry::ElementTag;

    fn element(tree: &mut ElementTree, tag: ElementTag, parent: Option<ElementId>) -> ElementId {
        let key = tree.next_key();
        tree.add(SerializedElement::new(key, tag, vec![], Span::default()), parent)
    }

    #[test]
    fn reports_missing_required_attribute() {
        let mut tree = ElementTree::new();
        let root = element(&mut tree, ElementTag::Workflow, None);
        element(&mut tree, ElementTag::Raise, Some(root));

        let mut diagnostics = Diagnostics::new();
        validate_attributes(&tree, &mut diagnostics);

        let codes: Vec<&str> = diagnostics.iter().map(|d| d.code.as_str()).collect();
        assert_eq!(codes, vec!["V001"]);
        assert!(diagnostics.has_errors());
    }

    #[test]
    fn enum_and_number_mismatches_warn() {
        let mut tree = ElementTree::new();
        let root = element(&mut tree, ElementTag::Workflow, None);
        let llm = element(&mut tree, ElementTag::Llm, Some(root));
        let node = tree.get_mut(llm);
        node.attributes.insert("responseFormat".into(), AttributeValue::string("xml"));
        node.attributes.insert("temperature".into(), AttributeValue::string("hot"));

        let mut diagnostics = Diagnostics::new();
        validate_attributes(&tree, &mut diagnostics);

        assert_eq!(diagnostics.with_code("V003").count(), 2);
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn expressions_pass_type_checks() {
        let spec = ElementTag::Llm.definition().attribute("temperature").unwrap();
        assert!(check_type(spec, &AttributeValue::expression("settings.temperature")).is_ok());
        assert!(check_type(spec, &AttributeValue::number(0.2)).is_ok());
    }

    #[test]
    fn disallowed_child_warns() {
        let mut tree = ElementTree::new();
        let root = element(&mut tree, ElementTag::Workflow, None);
        let fin = element(&mut tree, ElementTag::Final, Some(root));
        element(&mut tree, ElementTag::State, Some(fin));

        let mut diagnostics = Diagnostics::new();
        validate_attributes(&tree, &mut diagnostics);

        assert_eq!(diagnostics.with_code("V004").count(), 1);
    }

    #[test]
    fn workflow_accepts_frontmatter_attributes() {
        let mut tree = ElementTree::new();
        let root = element(&mut tree, ElementTag::Workflow, None);
        tree.get_mut(root)
            .attributes
            .insert("author".into(), AttributeValue::string("ops"));

        let mut diagnostics = Diagnostics::new();
        validate_attributes(&tree, &mut diagnostics);
        assert!(diagnostics.is_empty());
    }
}
