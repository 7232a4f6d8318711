//! WASM entry points for editor and browser use.

use wasm_bindgen::prelude::*;

use crate::compile::CompileOutput;
use crate::config::CompileOptions;
use crate::datamodel::DataModelMap;
use crate::element::ElementSnapshot;
use crate::error::Diagnostic;
use crate::heal::HealSummary;
use crate::registry::{AllowedChildren, AttributeType, ElementDefinition};
use crate::transform::ResolvedImport;

/// Full pipeline: parse → transform → validate → heal → structural checks.
/// Returns `{ status: "success", tree, dataModel, imports, heal, diagnostics }`,
/// or `{ status: "errors", diagnostics }` when the input could not be read.
#[wasm_bindgen]
pub fn compile_document(json: &str, options_json: &str) -> JsValue {
    let result = compile_document_inner(json, options_json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn compile_document_inner(json: &str, options_json: &str) -> CompileResult {
    let options = match CompileOptions::from_json(options_json) {
        Ok(o) => o,
        Err(e) => {
            let diagnostic = Diagnostic::parse("P002", format!("Failed to parse compile options JSON: {}", e));
            return CompileResult::Errors {
                diagnostics: vec![DiagnosticDto::from(diagnostic)],
            };
        }
    };

    match crate::compile::compile_json(json, &options) {
        Ok(compilation) => {
            let CompileOutput {
                tree,
                data_model,
                imports,
                diagnostics,
                heal,
            } = compilation.to_output();
            CompileResult::Success {
                tree,
                data_model,
                imports,
                heal,
                diagnostics: diagnostics.into_iter().map(DiagnosticDto::from).collect(),
            }
        }
        Err(errors) => CompileResult::Errors {
            diagnostics: errors.into_iter().map(DiagnosticDto::from).collect(),
        },
    }
}

/// Diagnostics only, for live editor feedback.
/// Returns a JSON array of diagnostic objects.
#[wasm_bindgen]
pub fn validate_document(json: &str) -> JsValue {
    let result = validate_document_inner(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn validate_document_inner(json: &str) -> Vec<DiagnosticDto> {
    match crate::compile::compile_json(json, &CompileOptions::default()) {
        Ok(compilation) => compilation
            .diagnostics
            .into_vec()
            .into_iter()
            .map(DiagnosticDto::from)
            .collect(),
        Err(errors) => errors.into_iter().map(DiagnosticDto::from).collect(),
    }
}

/// The static element registry, for completion and hover.
#[wasm_bindgen]
pub fn element_registry() -> JsValue {
    let result = element_registry_inner();
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn element_registry_inner() -> Vec<ElementDto> {
    crate::registry::definitions()
        .iter()
        .filter(|d| !d.tag.is_character_data())
        .map(ElementDto::from)
        .collect()
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct DiagnosticDto {
    code: String,
    phase: String,
    /// LSP `DiagnosticSeverity`.
    severity: u8,
    message: String,
    range: Option<crate::parse::Span>,
}

impl From<Diagnostic> for DiagnosticDto {
    fn from(d: Diagnostic) -> Self {
        DiagnosticDto {
            code: d.code,
            phase: d.phase.to_string(),
            severity: d.severity.lsp_code(),
            message: d.message,
            range: d.range,
        }
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct AttributeDto {
    name: &'static str,
    #[serde(rename = "type")]
    ty: &'static str,
    values: Option<&'static [&'static str]>,
    required: bool,
    documentation: &'static str,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct ElementDto {
    tag: &'static str,
    #[serde(rename = "type")]
    kind: crate::registry::ElementKind,
    sub_type: Option<crate::registry::ElementSubType>,
    /// `None` means any child is accepted.
    allowed_children: Option<Vec<&'static str>>,
    attributes: Vec<AttributeDto>,
    documentation: &'static str,
}

impl From<&ElementDefinition> for ElementDto {
    fn from(d: &ElementDefinition) -> Self {
        let allowed_children = match d.allowed_children {
            AllowedChildren::Any => None,
            AllowedChildren::None => Some(vec![]),
            AllowedChildren::Text => Some(vec!["#text"]),
            AllowedChildren::Tags(tags) => Some(tags.iter().map(|t| t.name()).collect()),
        };
        ElementDto {
            tag: d.tag.name(),
            kind: d.kind,
            sub_type: d.sub_type,
            allowed_children,
            attributes: d
                .attributes
                .iter()
                .map(|a| {
                    let (ty, values) = match a.ty {
                        AttributeType::String => ("string", None),
                        AttributeType::Number => ("number", None),
                        AttributeType::Boolean => ("boolean", None),
                        AttributeType::Json => ("json", None),
                        AttributeType::Expression => ("expression", None),
                        AttributeType::Enum(values) => ("enum", Some(values)),
                    };
                    AttributeDto {
                        name: a.name,
                        ty,
                        values,
                        required: a.required,
                        documentation: a.documentation,
                    }
                })
                .collect(),
            documentation: d.documentation,
        }
    }
}

#[derive(serde::Serialize)]
#[serde(tag = "status")]
enum CompileResult {
    #[serde(rename = "success")]
    Success {
        tree: Vec<ElementSnapshot>,
        #[serde(rename = "dataModel")]
        data_model: DataModelMap,
        imports: Vec<ResolvedImport>,
        heal: HealSummary,
        diagnostics: Vec<DiagnosticDto>,
    },
    #[serde(rename = "errors")]
    Errors { diagnostics: Vec<DiagnosticDto> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_document_reports_parse_error() {
        let diagnostics = validate_document_inner("not json");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, "P001");
        assert_eq!(diagnostics[0].severity, 1);
    }

    #[test]
    fn registry_omits_character_data() {
        let elements = element_registry_inner();
        assert!(elements.iter().all(|e| !e.tag.starts_with('#')));
        assert!(elements.iter().any(|e| e.tag == "llm"));
    }

    #[test]
    fn bad_options_are_reported() {
        let CompileResult::Errors { diagnostics } = compile_document_inner("{}", "{oops") else {
            panic!("expected errors");
        };
        assert_eq!(diagnostics[0].code, "P002");
    }
}
