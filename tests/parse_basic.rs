//! Integration tests for the Parse phase: syntax-tree JSON → SyntaxNode.

use flowmark::parse::{self, SyntaxAttributeValue, SyntaxNode};

#[test]
fn parse_support_fixture() {
    let json = include_str!("fixtures/support_workflow.json");
    let root = parse::parse(json).expect("Should parse successfully");

    let children = root.document_children();
    assert_eq!(children.len(), 5);
    assert_eq!(children[0].node_type(), "frontmatterField");
    assert_eq!(children[2].node_type(), "import");
    assert_eq!(children[3].node_type(), "comment");

    let SyntaxNode::Element(workflow) = &children[4] else {
        panic!("Expected workflow element, got {:?}", children[4]);
    };
    assert_eq!(workflow.name, "workflow");
    assert_eq!(workflow.children.len(), 4);
    assert_eq!(workflow.span.start.line, 6);
    match workflow.attribute("id") {
        Some(SyntaxAttributeValue::Literal { value }) => assert_eq!(value, "support"),
        other => panic!("Expected literal id, got {:?}", other),
    }
}

#[test]
fn parse_round_trip() {
    let json = include_str!("fixtures/support_workflow.json");
    let root = parse::parse(json).expect("Should parse");
    let serialized = serde_json::to_string(&root).expect("Should serialize");
    let again = parse::parse(&serialized).expect("Should parse again");
    assert_eq!(root.document_children().len(), again.document_children().len());
    assert_eq!(root.span(), again.span());
}

#[test]
fn missing_spans_default_to_zero() {
    let json = r#"{"type": "root", "children": [{"type": "text", "value": "hi"}]}"#;
    let root = parse::parse(json).expect("Should parse");
    assert_eq!(root.document_children()[0].span().start.line, 0);
}

#[test]
fn parse_invalid_json_returns_error() {
    let result = parse::parse("{ not json }");
    let errors = result.expect_err("Should fail");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, "P001");
    assert!(errors[0].severity.is_error());
}

#[test]
fn parse_unknown_node_type_returns_error() {
    let result = parse::parse(r#"{"type": "paragraph", "children": []}"#);
    assert!(result.is_err());
}
