//! Structural validation of backend output.
//!
//! Supports the subset of JSON Schema the tribunal contracts use: `type`
//! (object, array, string, integer, number, boolean), `properties`,
//! `required` and `items`. Everything here is pure; nothing is retried.

use serde_json::Value;
use thiserror::Error;

/// Reason a backend response could not be turned into a record
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("response is not valid JSON: {0}")]
    NotJson(String),

    #[error("schema violation at {path}: {message}")]
    Schema { path: String, message: String },

    #[error("could not decode record: {0}")]
    Decode(String),

    #[error("{field} out of range [0, 1]: {value}")]
    OutOfRange { field: &'static str, value: f64 },
}

/// Parse raw backend text as JSON.
///
/// A single surrounding markdown code fence (```` ```json ... ``` ````) is
/// tolerated; anything else must be the bare JSON document.
pub fn parse_json(text: &str) -> Result<Value, ValidationError> {
    let body = strip_code_fence(text.trim());
    serde_json::from_str(body).map_err(|e| ValidationError::NotJson(e.to_string()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(rest) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the info string (e.g. `json`) on the opening fence line
    match rest.find('\n') {
        Some(newline) => rest[newline + 1..].trim(),
        None => rest.trim(),
    }
}

/// Check `value` against `schema`.
pub fn validate(value: &Value, schema: &Value) -> Result<(), ValidationError> {
    validate_at(value, schema, "$")
}

fn validate_at(value: &Value, schema: &Value, path: &str) -> Result<(), ValidationError> {
    if let Some(expected) = schema.get("type").and_then(Value::as_str)
        && !type_matches(value, expected)
    {
        return Err(ValidationError::Schema {
            path: path.to_string(),
            message: format!("expected {}, found {}", expected, type_name(value)),
        });
    }

    if let Value::Object(map) = value {
        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for key in required.iter().filter_map(Value::as_str) {
                if !map.contains_key(key) {
                    return Err(ValidationError::Schema {
                        path: path.to_string(),
                        message: format!("missing required field '{}'", key),
                    });
                }
            }
        }
        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            for (key, sub_schema) in properties {
                if let Some(field) = map.get(key) {
                    validate_at(field, sub_schema, &format!("{}.{}", path, key))?;
                }
            }
        }
    }

    if let (Value::Array(items), Some(item_schema)) = (value, schema.get("items")) {
        for (i, item) in items.iter().enumerate() {
            validate_at(item, item_schema, &format!("{}[{}]", path, i))?;
        }
    }

    Ok(())
}

fn type_matches(value: &Value, expected: &str) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Reject probabilities outside `[0, 1]`.
pub fn check_unit_interval(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::documents::{judgment_schema, review_schema, solution_draft_schema};
    use serde_json::json;

    #[test]
    fn test_parse_plain_json() {
        assert_eq!(parse_json(r#"{"a": 1}"#).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "```json\n{\"a\": 1}\n```";
        assert_eq!(parse_json(text).unwrap(), json!({"a": 1}));
        let text = "```\n[1, 2]\n```";
        assert_eq!(parse_json(text).unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_parse_prose_fails() {
        let err = parse_json("The answer is 4.").unwrap_err();
        assert!(matches!(err, ValidationError::NotJson(_)));
        let err = parse_json("Sure! {\"a\": 1}").unwrap_err();
        assert!(matches!(err, ValidationError::NotJson(_)));
    }

    #[test]
    fn test_valid_solution_draft() {
        let value = json!({
            "steps": [{"step": 1, "reasoning": "add", "answer": "4"}],
            "final_answer": "4",
            "confidence": 0.9
        });
        assert!(validate(&value, solution_draft_schema()).is_ok());
    }

    #[test]
    fn test_missing_required_field() {
        let value = json!({"steps": [], "final_answer": "4"});
        let err = validate(&value, solution_draft_schema()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Schema {
                path: "$".to_string(),
                message: "missing required field 'confidence'".to_string(),
            }
        );
    }

    #[test]
    fn test_nested_item_type_mismatch() {
        let value = json!({
            "steps": [{"step": "one", "reasoning": "add", "answer": "4"}],
            "final_answer": "4",
            "confidence": 0.9
        });
        let err = validate(&value, solution_draft_schema()).unwrap_err();
        match err {
            ValidationError::Schema { path, .. } => assert_eq!(path, "$.steps[0].step"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_integer_rejects_float() {
        let value = json!({
            "steps": [{"step": 1.5, "reasoning": "add", "answer": "4"}],
            "final_answer": "4",
            "confidence": 1
        });
        assert!(validate(&value, solution_draft_schema()).is_err());
    }

    #[test]
    fn test_review_requires_all_evaluation_fields() {
        let value = json!({
            "reviewer_id": "solver_1",
            "solution_id": "solver_2",
            "evaluation": {
                "strengths": [],
                "weaknesses": [],
                "errors": [],
                "scores": {}
            }
        });
        let err = validate(&value, review_schema()).unwrap_err();
        assert!(err.to_string().contains("suggested_changes"));
    }

    #[test]
    fn test_judgment_top_level_must_be_object() {
        let err = validate(&json!(["solver_1"]), judgment_schema()).unwrap_err();
        assert!(err.to_string().contains("expected object"));
    }

    #[test]
    fn test_unit_interval() {
        assert!(check_unit_interval("confidence", 0.0).is_ok());
        assert!(check_unit_interval("confidence", 1.0).is_ok());
        assert!(check_unit_interval("confidence", 1.2).is_err());
        assert!(check_unit_interval("confidence", f64::NAN).is_err());
    }
}
