//! Field declarations produced by `data` elements.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Boolean,
    Json,
}

impl FieldType {
    pub fn from_name(name: &str) -> Option<FieldType> {
        match name.trim().to_ascii_lowercase().as_str() {
            "string" => Some(FieldType::String),
            "number" => Some(FieldType::Number),
            "boolean" => Some(FieldType::Boolean),
            "json" => Some(FieldType::Json),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Number => write!(f, "number"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub from_request: bool,
    #[serde(default)]
    pub default_value: Option<serde_json::Value>,
    /// JSON Schema the value must satisfy on every write.
    #[serde(default)]
    pub schema: Option<serde_json::Value>,
}

impl FieldDefinition {
    pub fn new(field_type: FieldType) -> Self {
        FieldDefinition {
            field_type,
            ..Default::default()
        }
    }

    pub fn readonly(mut self) -> Self {
        self.readonly = true;
        self
    }

    pub fn from_request(mut self) -> Self {
        self.from_request = true;
        self
    }

    pub fn with_default(mut self, value: serde_json::Value) -> Self {
        self.default_value = Some(value);
        self
    }

    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = Some(schema);
        self
    }
}
