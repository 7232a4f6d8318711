use flowmark::element::{ElementId, ElementTree};
use flowmark::error::Diagnostics;
use flowmark::parse::*;
use flowmark::{Compilation, CompileOptions};
use serde_json::Value;

// =============================================================================
// Syntax tree builders
// =============================================================================

pub fn doc(children: Vec<SyntaxNode>) -> SyntaxNode {
    SyntaxNode::Root(RootNode {
        children,
        span: Span::default(),
    })
}

pub fn lit(name: &str, value: impl Into<Value>) -> SyntaxAttribute {
    SyntaxAttribute {
        name: name.into(),
        value: SyntaxAttributeValue::Literal { value: value.into() },
    }
}

pub fn expr_attr(name: &str, source: &str) -> SyntaxAttribute {
    SyntaxAttribute {
        name: name.into(),
        value: SyntaxAttributeValue::Expression {
            source: source.into(),
        },
    }
}

pub fn el(name: &str, attributes: Vec<SyntaxAttribute>, children: Vec<SyntaxNode>) -> SyntaxNode {
    el_at(name, 1, attributes, children)
}

pub fn el_at(name: &str, line: u32, attributes: Vec<SyntaxAttribute>, children: Vec<SyntaxNode>) -> SyntaxNode {
    SyntaxNode::Element(ElementNode {
        name: name.into(),
        attributes,
        children,
        span: Span::new(Position::new(line, 0), Position::new(line, 1)),
    })
}

pub fn workflow(children: Vec<SyntaxNode>) -> SyntaxNode {
    el("workflow", vec![], children)
}

pub fn state(id: &str, children: Vec<SyntaxNode>) -> SyntaxNode {
    el("state", vec![lit("id", id)], children)
}

pub fn transition(target: &str, cond: Option<&str>) -> SyntaxNode {
    let mut attributes = vec![lit("target", target)];
    if let Some(cond) = cond {
        attributes.push(expr_attr("cond", cond));
    }
    el("transition", attributes, vec![])
}

pub fn text(value: &str) -> SyntaxNode {
    text_at(value, 1)
}

pub fn text_at(value: &str, line: u32) -> SyntaxNode {
    SyntaxNode::Text(TextNode {
        value: value.into(),
        span: Span::new(Position::new(line, 0), Position::new(line, value.len() as u32)),
    })
}

pub fn expr(source: &str) -> SyntaxNode {
    SyntaxNode::Expression(ExpressionNode {
        source: source.into(),
        span: Span::default(),
    })
}

// =============================================================================
// Pipeline helpers
// =============================================================================

pub fn compile(root: &SyntaxNode) -> Compilation {
    flowmark::compile(root, &CompileOptions::default())
}

pub fn codes(diagnostics: &Diagnostics) -> Vec<String> {
    diagnostics.iter().map(|d| d.code.clone()).collect()
}

/// First attached element declaring `id`.
pub fn find(tree: &ElementTree, id: &str) -> Option<ElementId> {
    tree.attached().into_iter().find(|e| tree.get(*e).id() == Some(id))
}

/// Ids of the state children of `parent`, in order.
pub fn state_ids(tree: &ElementTree, parent: ElementId) -> Vec<String> {
    tree.state_children(parent)
        .filter_map(|s| tree.get(s).id().map(str::to_string))
        .collect()
}

/// Targets of the `transition` children of the state declaring `id`.
pub fn targets(tree: &ElementTree, id: &str) -> Vec<String> {
    let Some(state) = find(tree, id) else {
        return vec![];
    };
    tree.children(state)
        .iter()
        .map(|c| tree.get(*c))
        .filter(|c| c.tag == flowmark::registry::ElementTag::Transition)
        .filter_map(|c| c.attribute("target").map(|t| t.source_text()))
        .collect()
}
