//! Input validation against JSON schemas

use crate::error::{MetaError, Result};
use serde_json::Value;

/// Validate input against a JSON schema
pub fn validate_input(input: &Value, schema: &Value) -> Result<()> {
    if schema.get("type").and_then(|t| t.as_str()) == Some("object") && !input.is_object() {
        return Err(MetaError::Validation("Input must be an object".to_string()));
    }

    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        for field_name in required {
            let field_str = field_name
                .as_str()
                .ok_or_else(|| MetaError::Validation("Invalid schema: required field not a string".to_string()))?;

            if input.get(field_str).is_none() {
                return Err(MetaError::Validation(format!("Missing required field: {}", field_str)));
            }
        }
    }

    if let Some(properties) = schema.get("properties").and_then(|p| p.as_object()) {
        if let Some(input_obj) = input.as_object() {
            for (key, value) in input_obj {
                if let Some(prop_schema) = properties.get(key) {
                    validate_type(key, value, prop_schema)?;
                }
            }
        }
    }

    Ok(())
}

/// Validate that a value matches the expected type; array items are
/// checked against `items` when the schema gives one.
fn validate_type(key: &str, value: &Value, schema: &Value) -> Result<()> {
    if let Some(expected_type) = schema.get("type").and_then(|t| t.as_str()) {
        let valid = match expected_type {
            "string" => value.is_string(),
            "integer" => value.is_i64() || value.is_u64(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "array" => value.is_array(),
            "object" => value.is_object(),
            "null" => value.is_null(),
            _ => true,
        };

        if !valid {
            return Err(MetaError::Validation(format!(
                "Type mismatch for {}: expected {}, got {}",
                key, expected_type, value
            )));
        }
    }

    if let (Some(items), Some(item_schema)) = (value.as_array(), schema.get("items")) {
        for item in items {
            if item_schema.get("type").and_then(|t| t.as_str()) == Some("object") {
                validate_input(item, item_schema)?;
            } else {
                validate_type(key, item, item_schema)?;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_required_fields() {
        let schema = json!({
            "type": "object",
            "required": ["file_name", "tags"]
        });

        let valid_input = json!({
            "file_name": "IMG_0001.jpg",
            "tags": {"Make": "Apple"}
        });

        assert!(validate_input(&valid_input, &schema).is_ok());

        let invalid_input = json!({
            "file_name": "IMG_0001.jpg"
        });

        assert!(validate_input(&invalid_input, &schema).is_err());
        assert!(validate_input(&json!("IMG_0001.jpg"), &schema).is_err());
    }

    #[test]
    fn test_validate_types() {
        let schema = json!({
            "type": "object",
            "properties": {
                "path": { "type": "string" },
                "tags": { "type": "object" }
            }
        });

        assert!(validate_input(&json!({"path": "/tmp/a.jpg", "tags": {}}), &schema).is_ok());
        assert!(validate_input(&json!({"path": 42}), &schema).is_err());
    }

    #[test]
    fn test_validate_array_items() {
        let schema = json!({
            "type": "object",
            "required": ["files"],
            "properties": {
                "files": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "required": ["id", "path"],
                        "properties": {"path": {"type": "string"}}
                    }
                }
            }
        });

        assert!(validate_input(&json!({"files": [{"id": 1, "path": "/a.jpg"}]}), &schema).is_ok());
        assert!(validate_input(&json!({"files": [{"id": 1}]}), &schema).is_err());
        assert!(validate_input(&json!({"files": [{"id": 1, "path": 7}]}), &schema).is_err());
    }
}
