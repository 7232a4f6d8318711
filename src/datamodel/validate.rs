//! Value checks applied on every data-model write.

use jsonschema::Validator;
use serde_json::Value;

use super::DataModelError;
use super::field::{FieldDefinition, FieldType};

/// Compile a field's JSON schema, if it has one.
pub(crate) fn compile_schema(
    field: &str,
    definition: &FieldDefinition,
) -> Result<Option<Validator>, DataModelError> {
    let Some(schema) = &definition.schema else {
        return Ok(None);
    };
    jsonschema::validator_for(schema)
        .map(Some)
        .map_err(|e| DataModelError::InvalidSchema {
            field: field.to_string(),
            reason: e.to_string(),
        })
}

/// Check `value` against the declared type, then against the schema.
pub(crate) fn validate_value(
    field: &str,
    definition: &FieldDefinition,
    validator: Option<&Validator>,
    value: &Value,
) -> Result<(), DataModelError> {
    check_type(definition.field_type, value).map_err(|reason| DataModelError::ValidationFailed {
        field: field.to_string(),
        reason,
    })?;

    if let Some(validator) = validator {
        let errors: Vec<String> = validator.iter_errors(value).map(|e| e.to_string()).collect();
        if !errors.is_empty() {
            return Err(DataModelError::ValidationFailed {
                field: field.to_string(),
                reason: errors.join("; "),
            });
        }
    }

    Ok(())
}

fn check_type(field_type: FieldType, value: &Value) -> Result<(), String> {
    match field_type {
        FieldType::String => match value {
            Value::String(_) => Ok(()),
            other => Err(format!("expected a string, got {}", describe(other))),
        },
        FieldType::Number => match value.as_f64() {
            Some(n) if n.is_finite() => Ok(()),
            Some(_) => Err("expected a finite number".into()),
            None => Err(format!("expected a number, got {}", describe(value))),
        },
        FieldType::Boolean => match value {
            Value::Bool(_) => Ok(()),
            other => Err(format!("expected a boolean, got {}", describe(other))),
        },
        FieldType::Json => Ok(()),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
