use serde_json::Value;
use crate::errors::OracleError;
use crate::models::decision::Decision;

/// Parse an oracle reply. The whole text must be one JSON object; anything
/// else is a `MalformedResponse` that keeps the raw text.
pub fn parse_decision(raw: &str) -> Result<Decision, OracleError> {
    let malformed = |reason: String| OracleError::MalformedResponse {
        reason,
        raw: raw.to_string(),
    };

    let value: Value = serde_json::from_str(raw.trim())
        .map_err(|e| malformed(format!("reply is not valid JSON: {}", e)))?;

    if !value.is_object() {
        return Err(malformed(format!("expected a JSON object, got {}", json_kind(&value))));
    }

    serde_json::from_value(value)
        .map_err(|e| malformed(format!("reply does not match the decision shape: {}", e)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
