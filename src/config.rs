//! Compilation options.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Path of the document being compiled; relative imports resolve against
    /// its directory.
    pub file_path: Option<String>,
    /// Elements nested deeper than this are reported and skipped.
    pub max_depth: usize,
    /// Run the healer after transformation.
    pub heal: bool,
    /// Run transition-graph checks on the healed tree.
    pub validate_structure: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            file_path: None,
            max_depth: 128,
            heal: true,
            validate_structure: true,
        }
    }
}

impl CompileOptions {
    pub fn with_file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Parse options JSON; an empty string yields the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        if json.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let options = CompileOptions::from_json(r#"{"filePath": "flow.mdx"}"#).unwrap();
        assert_eq!(options.file_path.as_deref(), Some("flow.mdx"));
        assert_eq!(options.max_depth, 128);
        assert!(options.heal);
    }

    #[test]
    fn empty_json_is_default() {
        assert_eq!(CompileOptions::from_json("").unwrap(), CompileOptions::default());
    }
}
