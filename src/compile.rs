//! The compilation pipeline: transform → validate attributes → heal →
//! validate structure.

use std::sync::Arc;

use log::info;
use serde::Serialize;

use crate::config::CompileOptions;
use crate::datamodel::{DataModel, DataModelMap};
use crate::element::{ElementSnapshot, ElementTree};
use crate::error::{Diagnostic, Diagnostics, Phase, Severity};
use crate::graph::{ExecutionGraphElement, GraphBuilder};
use crate::heal::{self, HealSummary};
use crate::parse::SyntaxNode;
use crate::transform::{self, ResolvedImport};
use crate::validate;

/// Everything one compilation produces.
pub struct Compilation {
    pub tree: ElementTree,
    pub diagnostics: Diagnostics,
    /// Live data model seeded with the declared defaults.
    pub datamodel: DataModel,
    /// Field declarations per scope path, as written.
    pub definitions: DataModelMap,
    pub imports: Vec<ResolvedImport>,
    pub heal: HealSummary,
}

impl Compilation {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    /// Build the execution graph of the healed tree.
    pub fn execution_graph(&self) -> Option<Arc<ExecutionGraphElement>> {
        GraphBuilder::new().build_root(&self.tree)
    }

    /// JSON-friendly summary of the compilation.
    pub fn to_output(&self) -> CompileOutput {
        CompileOutput {
            tree: self.tree.to_serialized(),
            data_model: self.definitions.clone(),
            imports: self.imports.clone(),
            diagnostics: self.diagnostics.iter().cloned().collect(),
            heal: self.heal,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOutput {
    pub tree: Vec<ElementSnapshot>,
    pub data_model: DataModelMap,
    pub imports: Vec<ResolvedImport>,
    pub diagnostics: Vec<Diagnostic>,
    pub heal: HealSummary,
}

/// Compile a parsed document.
pub fn compile(root: &SyntaxNode, options: &CompileOptions) -> Compilation {
    info!(file:? = options.file_path; "Compiling workflow");

    let transform::TransformOutput {
        mut tree,
        mut diagnostics,
        datamodel: definitions,
        imports,
    } = transform::transform(root, options);

    validate::attributes::validate_attributes(&tree, &mut diagnostics);

    let heal = if options.heal {
        heal::heal(&mut tree, &mut diagnostics)
    } else {
        HealSummary::default()
    };

    if options.validate_structure {
        validate::structural::validate_structural(&tree, &mut diagnostics);
    }

    let datamodel = match DataModel::from_definitions(&definitions) {
        Ok(model) => model,
        Err(e) => {
            diagnostics.push(Diagnostic::new(Phase::Transform, Severity::Error, "T005", e.to_string(), None));
            DataModel::new()
        }
    };

    info!(
        elements = tree.len(),
        diagnostics = diagnostics.len(),
        errors = diagnostics.has_errors();
        "Compilation finished"
    );

    Compilation {
        tree,
        diagnostics,
        datamodel,
        definitions,
        imports,
        heal,
    }
}

/// Parse `json` and compile it. Fails only when the input is not a valid
/// syntax tree.
pub fn compile_json(json: &str, options: &CompileOptions) -> Result<Compilation, Vec<Diagnostic>> {
    let root = crate::parse::parse(json)?;
    Ok(compile(&root, options))
}
