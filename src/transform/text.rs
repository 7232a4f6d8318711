//! Merging of adjacent text nodes.
//!
//! The tokenizer splits prose at soft line breaks; two text nodes that sit next
//! to each other at the same level are folded back into one.

use crate::parse::{Span, SyntaxNode};

pub(super) enum Content<'a> {
    Node(&'a SyntaxNode),
    Text { value: String, span: Span },
}

pub(super) fn merge_adjacent_text<'a>(nodes: &[&'a SyntaxNode]) -> Vec<Content<'a>> {
    let mut out: Vec<Content<'a>> = Vec::with_capacity(nodes.len());
    for node in nodes {
        let SyntaxNode::Text(text) = node else {
            out.push(Content::Node(node));
            continue;
        };
        if let Some(Content::Text { value, span }) = out.last_mut() {
            if text.span.start.line > span.end.line {
                value.push('\n');
            }
            value.push_str(&text.value);
            *span = span.merge(text.span);
        } else {
            out.push(Content::Text {
                value: text.value.clone(),
                span: text.span,
            });
        }
    }
    out
}

/// Concatenated text of an element's direct text children, or `None` when it
/// has none.
pub(super) fn collect_text(children: &[SyntaxNode]) -> Option<String> {
    let refs: Vec<&SyntaxNode> = children.iter().collect();
    let text: Vec<String> = merge_adjacent_text(&refs)
        .into_iter()
        .filter_map(|c| match c {
            Content::Text { value, .. } => Some(value),
            Content::Node(_) => None,
        })
        .collect();
    if text.is_empty() {
        None
    } else {
        Some(text.join(""))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::{Position, TextNode};

    fn text(value: &str, line: u32, start: u32, end: u32) -> SyntaxNode {
        SyntaxNode::Text(TextNode {
            value: value.into(),
            span: Span::new(Position::new(line, start), Position::new(line, end)),
        })
    }

    #[test]
    fn adjacent_text_on_new_line_joins_with_newline() {
        let a = text("Summarize the", 3, 2, 15);
        let b = text("following article", 4, 2, 19);
        let merged = merge_adjacent_text(&[&a, &b]);
        assert_eq!(merged.len(), 1);
        let Content::Text { value, span } = &merged[0] else {
            panic!("expected merged text");
        };
        assert_eq!(value, "Summarize the\nfollowing article");
        assert_eq!(span.start, Position::new(3, 2));
        assert_eq!(span.end, Position::new(4, 19));
    }

    #[test]
    fn same_line_text_concatenates() {
        let a = text("foo", 1, 0, 3);
        let b = text("bar", 1, 3, 6);
        let merged = merge_adjacent_text(&[&a, &b]);
        assert!(matches!(&merged[0], Content::Text { value, .. } if value == "foobar"));
    }
}
