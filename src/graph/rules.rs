//! Per-kind construction rules.

use std::sync::Arc;

use indexmap::IndexMap;

use super::ExecutionGraphElement;
use crate::element::{AttributeValue, LiteralValue, SerializedElement};
use crate::registry::{ElementKind, ElementTag};

pub(super) fn construct(
    element: &SerializedElement,
    children: Vec<Arc<ExecutionGraphElement>>,
) -> ExecutionGraphElement {
    let mut attributes = element.attributes.clone();

    match element.kind {
        ElementKind::Action if element.tag == ElementTag::Llm => {
            derive_from_content(&mut attributes, "prompt", &children);
        }
        ElementKind::UserInput => {
            derive_from_content(&mut attributes, "prompt", &children);
        }
        ElementKind::Output if element.tag == ElementTag::SendText => {
            derive_from_content(&mut attributes, "expr", &children);
        }
        ElementKind::State
        | ElementKind::Action
        | ElementKind::ControlFlow
        | ElementKind::Data
        | ElementKind::Output
        | ElementKind::Error => {}
    }

    ExecutionGraphElement {
        id: element.id().unwrap_or(&element.key).to_string(),
        key: element.key.clone(),
        kind: element.kind,
        sub_type: element.sub_type,
        tag: element.tag,
        scope: element.scope.clone(),
        attributes,
        children,
    }
}

/// Fill `name` from the element's character-data children when the author
/// did not set it.
fn derive_from_content(
    attributes: &mut IndexMap<String, AttributeValue>,
    name: &str,
    children: &[Arc<ExecutionGraphElement>],
) {
    if attributes.contains_key(name) {
        return;
    }
    if let Some(value) = content_value(children) {
        attributes.insert(name.to_string(), value);
    }
}

/// Text children become a string literal, a lone expression stays an
/// expression, and a mix becomes a template literal.
pub(super) fn content_value(children: &[Arc<ExecutionGraphElement>]) -> Option<AttributeValue> {
    let parts: Vec<(ElementTag, String)> = children
        .iter()
        .filter(|c| c.tag.is_character_data())
        .filter_map(|c| c.attribute("value").map(|v| (c.tag, v.source_text())))
        .collect();

    match parts.as_slice() {
        [] => None,
        [(ElementTag::Expression, source)] => Some(AttributeValue::Expression(source.clone())),
        _ if parts.iter().all(|(tag, _)| *tag == ElementTag::Text) => {
            let text: Vec<&str> = parts.iter().map(|(_, s)| s.as_str()).collect();
            Some(AttributeValue::Literal(LiteralValue::String(text.join("\n").trim().to_string())))
        }
        _ => {
            let mut template = String::from("`");
            for (tag, value) in &parts {
                if *tag == ElementTag::Expression {
                    template.push_str("${");
                    template.push_str(value);
                    template.push('}');
                } else {
                    template.push_str(&value.replace('`', "\\`").replace("${", "\\${"));
                }
            }
            template.push('`');
            Some(AttributeValue::Expression(template))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(tag: ElementTag, value: AttributeValue) -> Arc<ExecutionGraphElement> {
        let mut attributes = IndexMap::new();
        attributes.insert("value".to_string(), value);
        Arc::new(ExecutionGraphElement {
            id: "k".into(),
            key: "k".into(),
            kind: ElementKind::Data,
            sub_type: None,
            tag,
            scope: vec![],
            attributes,
            children: vec![],
        })
    }

    #[test]
    fn text_only_becomes_literal() {
        let children = vec![leaf(ElementTag::Text, AttributeValue::string("  Summarize this  "))];
        assert_eq!(content_value(&children), Some(AttributeValue::string("Summarize this")));
    }

    #[test]
    fn lone_expression_stays_expression() {
        let children = vec![leaf(ElementTag::Expression, AttributeValue::expression("input.text"))];
        assert_eq!(content_value(&children), Some(AttributeValue::expression("input.text")));
    }

    #[test]
    fn mixed_content_becomes_template() {
        let children = vec![
            leaf(ElementTag::Text, AttributeValue::string("Hello ")),
            leaf(ElementTag::Expression, AttributeValue::expression("user.name")),
        ];
        assert_eq!(
            content_value(&children),
            Some(AttributeValue::expression("`Hello ${user.name}`"))
        );
    }
}
