//! Transform phase: SyntaxNode → element tree + data model + diagnostics.
//!
//! Recursive descent over the parser's tree. Tags are resolved against the
//! static registry, state scopes are tracked on a stack, and `data`
//! declarations are registered under the scope path in effect where they
//! appear. Problems are reported as diagnostics; the pass always produces a
//! tree with exactly one workflow root.

mod attributes;
mod data;
pub mod imports;
mod text;

use log::{debug, info};

pub use data::coerce;
pub use imports::ResolvedImport;

use crate::config::CompileOptions;
use crate::datamodel::DataModelMap;
use crate::element::{AttributeValue, ElementId, ElementTree, SerializedElement};
use crate::error::{Diagnostic, Diagnostics, Severity};
use crate::parse::{ElementNode, Span, SyntaxNode};
use crate::registry::{ElementKind, ElementTag};

use text::Content;

pub struct TransformOutput {
    pub tree: ElementTree,
    pub diagnostics: Diagnostics,
    pub datamodel: DataModelMap,
    pub imports: Vec<ResolvedImport>,
}

/// A node that cannot be transformed. Raised inside the recursion and turned
/// into a diagnostic at the boundary; only the offending subtree is skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("element has an empty tag name")]
    EmptyTagName,
    #[error("attribute '{name}' is declared more than once")]
    DuplicateAttribute { name: String },
    #[error("nesting exceeds the maximum depth of {limit}")]
    NestingTooDeep { limit: usize },
    #[error("unexpected {node_type} node inside an element")]
    UnexpectedNode { node_type: &'static str },
}

/// Transform a parsed document.
pub fn transform(root: &SyntaxNode, options: &CompileOptions) -> TransformOutput {
    info!("Transforming syntax tree");
    let mut transformer = Transformer::new(options);
    transformer.run(root);

    let output = TransformOutput {
        tree: transformer.tree,
        diagnostics: transformer.diagnostics,
        datamodel: transformer.datamodel,
        imports: transformer.imports,
    };
    debug!(
        elements = output.tree.len(),
        scopes = output.datamodel.len(),
        diagnostics = output.diagnostics.len();
        "Transform complete"
    );
    output
}

pub(crate) struct Transformer<'a> {
    options: &'a CompileOptions,
    tree: ElementTree,
    diagnostics: Diagnostics,
    datamodel: DataModelMap,
    imports: Vec<ResolvedImport>,
    /// Ids of the enclosing states, outermost first.
    scope: Vec<String>,
    depth: usize,
}

impl<'a> Transformer<'a> {
    fn new(options: &'a CompileOptions) -> Self {
        Transformer {
            options,
            tree: ElementTree::new(),
            diagnostics: Diagnostics::new(),
            datamodel: DataModelMap::new(),
            imports: Vec::new(),
            scope: Vec::new(),
            depth: 0,
        }
    }

    fn run(&mut self, root: &SyntaxNode) {
        let top_level = root.document_children();
        let workflow_index = top_level.iter().position(|node| {
            matches!(node, SyntaxNode::Element(e) if ElementTag::from_name(&e.name) == Some(ElementTag::Workflow))
        });

        let root_id = match workflow_index.map(|i| &top_level[i]) {
            Some(SyntaxNode::Element(workflow)) => self.create_root(Some(workflow), workflow.span),
            _ => self.create_root(None, root.span()),
        };

        let mut content: Vec<&SyntaxNode> = Vec::new();
        for (i, node) in top_level.iter().enumerate() {
            match node {
                SyntaxNode::Element(e) if Some(i) == workflow_index => content.extend(e.children.iter()),
                SyntaxNode::Element(e) if ElementTag::from_name(&e.name) == Some(ElementTag::Workflow) => {
                    self.diagnostics.push(Diagnostic::transform(
                        Severity::Error,
                        "T006",
                        format!(
                            "Only one <workflow> is allowed; the one at line {} was ignored",
                            e.span.start.line
                        ),
                        e.span,
                    ));
                }
                SyntaxNode::Element(e) => {
                    if workflow_index.is_some() {
                        self.diagnostics.push(Diagnostic::transform(
                            Severity::Information,
                            "T007",
                            format!("<{}> outside <workflow> was moved into it", e.name),
                            e.span,
                        ));
                    }
                    content.push(node);
                }
                SyntaxNode::FrontmatterField(field) => {
                    self.tree
                        .get_mut(root_id)
                        .attributes
                        .insert(field.key.clone(), attributes::json_value(&field.value));
                }
                SyntaxNode::Expression(e) => {
                    self.diagnostics.push(Diagnostic::transform(
                        Severity::Information,
                        "T008",
                        format!("Top-level expression '{}' is ignored", e.source.trim()),
                        e.span,
                    ));
                }
                SyntaxNode::Root(r) => {
                    self.diagnostics.push(Diagnostic::transform(
                        Severity::Error,
                        "T010",
                        "Nested document root was skipped",
                        r.span,
                    ));
                }
                SyntaxNode::Text(_) | SyntaxNode::Import(_) | SyntaxNode::Comment(_) => content.push(node),
            }
        }

        self.transform_children(&content, root_id);
    }

    fn create_root(&mut self, workflow: Option<&ElementNode>, span: Span) -> ElementId {
        let key = self.tree.next_key();
        let mut element = SerializedElement::new(key, ElementTag::Workflow, Vec::new(), span);
        if let Some(workflow) = workflow {
            match attributes::convert_attributes(workflow) {
                Ok(attrs) => element.attributes = attrs,
                Err(e) => self.report_malformed(&workflow.name, &e, span),
            }
        }
        self.tree.add(element, None)
    }

    fn transform_children(&mut self, nodes: &[&SyntaxNode], parent: ElementId) {
        for content in text::merge_adjacent_text(nodes) {
            match content {
                Content::Text { value, span } => {
                    if value.trim().is_empty() {
                        continue;
                    }
                    self.add_character_data(ElementTag::Text, AttributeValue::string(value), span, parent);
                }
                Content::Node(SyntaxNode::Element(element)) => {
                    if let Err(e) = self.transform_element(element, parent) {
                        self.report_malformed(&element.name, &e, element.span);
                    }
                }
                Content::Node(SyntaxNode::Expression(expression)) => {
                    let value = attributes::expression_value(&expression.source);
                    self.add_character_data(ElementTag::Expression, value, expression.span, parent);
                }
                Content::Node(SyntaxNode::Import(import)) => {
                    match imports::resolve_import(import, self.options.file_path.as_deref()) {
                        Ok(resolved) => self.imports.push(resolved),
                        Err(message) => {
                            self.diagnostics
                                .push(Diagnostic::transform(Severity::Error, "T004", message, import.span));
                        }
                    }
                }
                Content::Node(SyntaxNode::Comment(_)) => {}
                Content::Node(SyntaxNode::FrontmatterField(field)) => {
                    self.diagnostics.push(Diagnostic::transform(
                        Severity::Information,
                        "T008",
                        format!("Frontmatter field '{}' outside the document header is ignored", field.key),
                        field.span,
                    ));
                }
                Content::Node(node) => {
                    let e = TransformError::UnexpectedNode {
                        node_type: node.node_type(),
                    };
                    self.report_malformed(node.node_type(), &e, node.span());
                }
            }
        }
    }

    fn transform_element(&mut self, node: &ElementNode, parent: ElementId) -> Result<(), TransformError> {
        if node.name.trim().is_empty() {
            return Err(TransformError::EmptyTagName);
        }
        if self.depth >= self.options.max_depth {
            return Err(TransformError::NestingTooDeep {
                limit: self.options.max_depth,
            });
        }

        let Some(tag) = ElementTag::from_name(&node.name) else {
            self.diagnostics.push(Diagnostic::transform(
                Severity::Warning,
                "T001",
                format!("Unknown element <{}> was removed", node.name),
                node.span,
            ));
            return Ok(());
        };
        if tag.name() != node.name {
            self.diagnostics.push(Diagnostic::transform(
                Severity::Warning,
                "T009",
                format!("Element <{}> was corrected to <{}>", node.name, tag.name()),
                node.span,
            ));
        }
        if tag == ElementTag::Workflow {
            self.diagnostics.push(Diagnostic::transform(
                Severity::Error,
                "T006",
                format!("Nested <workflow> at line {} was ignored", node.span.start.line),
                node.span,
            ));
            return Ok(());
        }

        let attributes = attributes::convert_attributes(node)?;
        let key = self.tree.next_key();
        let mut element = SerializedElement::new(key, tag, self.scope.clone(), node.span);
        element.attributes = attributes;

        let entered_scope = if tag.kind() == ElementKind::State {
            let state_id = self.ensure_state_id(&mut element);
            self.scope.push(state_id);
            element.scope = self.scope.clone();
            true
        } else {
            false
        };

        let id = self.tree.add(element, Some(parent));
        if tag == ElementTag::Data {
            data::register_field(self, id, node);
        }

        self.depth += 1;
        let children: Vec<&SyntaxNode> = node.children.iter().collect();
        self.transform_children(&children, id);
        self.depth -= 1;

        if entered_scope {
            self.scope.pop();
        }
        Ok(())
    }

    /// Return the state's id, synthesizing one when it is missing or not a
    /// string literal. Final states get a silent default.
    fn ensure_state_id(&mut self, element: &mut SerializedElement) -> String {
        if let Some(id) = element.id() {
            return id.to_string();
        }

        if element.tag == ElementTag::Final {
            let id = if self.scope.is_empty() {
                "final".to_string()
            } else {
                self.tree.next_generated_id("final")
            };
            element.attributes.insert("id".into(), AttributeValue::string(id.clone()));
            return id;
        }

        let id = self.tree.next_generated_id("anonymous_state");
        let reason = match element.attribute("id") {
            Some(value) if !value.is_literal() => "has a computed id",
            _ => "has no id",
        };
        self.diagnostics.push(Diagnostic::transform(
            Severity::Warning,
            "T002",
            format!(
                "<{}> at line {} {}; using '{}'",
                element.tag,
                element.span.start.line,
                reason,
                id
            ),
            element.span,
        ));
        element.attributes.insert("id".into(), AttributeValue::string(id.clone()));
        id
    }

    fn add_character_data(&mut self, tag: ElementTag, value: AttributeValue, span: Span, parent: ElementId) {
        let key = self.tree.next_key();
        let element = SerializedElement::new(key, tag, self.scope.clone(), span).with_attribute("value", value);
        self.tree.add(element, Some(parent));
    }

    fn report_malformed(&mut self, name: &str, error: &TransformError, span: Span) {
        self.diagnostics.push(Diagnostic::transform(
            Severity::Error,
            "T010",
            format!("Skipped malformed <{}> at line {}: {}", name, span.start.line, error),
            span,
        ));
    }
}
