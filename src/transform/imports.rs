//! Import specifier resolution.
//!
//! Only relative specifiers are supported. They are resolved lexically against
//! the directory of the document being compiled; the filesystem is not read.

use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::parse::{ImportNode, Span};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedImport {
    pub specifier: String,
    pub default_binding: Option<String>,
    pub path: String,
    pub span: Span,
}

pub(super) fn resolve_import(node: &ImportNode, file_path: Option<&str>) -> Result<ResolvedImport, String> {
    let specifier = node.source.trim();
    if !(specifier.starts_with("./") || specifier.starts_with("../")) {
        return Err(format!(
            "Import '{}' must be a relative path starting with './' or '../'",
            specifier
        ));
    }
    let Some(file_path) = file_path else {
        return Err(format!(
            "Cannot resolve import '{}' without a document path",
            specifier
        ));
    };

    let base = Path::new(file_path).parent().unwrap_or_else(|| Path::new(""));
    let path = normalize(&base.join(specifier))
        .ok_or_else(|| format!("Import '{}' escapes the document root", specifier))?;

    Ok(ResolvedImport {
        specifier: specifier.to_string(),
        default_binding: node.default_binding.clone(),
        path: path.to_string_lossy().into_owned(),
        span: node.span,
    })
}

fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                _ => return None,
            },
            other => out.push(other),
        }
    }
    Some(out.iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import(source: &str) -> ImportNode {
        ImportNode {
            source: source.into(),
            default_binding: Some("helper".into()),
            span: Span::default(),
        }
    }

    #[test]
    fn relative_import_resolves_against_document_dir() {
        let resolved = resolve_import(&import("../lib/tools.js"), Some("flows/main/flow.mdx")).unwrap();
        assert_eq!(resolved.path, "flows/lib/tools.js");
        assert_eq!(resolved.default_binding.as_deref(), Some("helper"));
    }

    #[test]
    fn bare_specifier_is_rejected() {
        assert!(resolve_import(&import("lodash"), Some("flow.mdx")).is_err());
    }

    #[test]
    fn missing_document_path_is_rejected() {
        assert!(resolve_import(&import("./tools.js"), None).is_err());
    }

    #[test]
    fn escaping_the_root_is_rejected() {
        assert!(resolve_import(&import("../../x.js"), Some("flow.mdx")).is_err());
    }
}
