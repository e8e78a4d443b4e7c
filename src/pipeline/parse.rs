use super::types::Structured;
use serde_json::Value;

pub const INVALID_JSON_MESSAGE: &str = "Model returned invalid JSON";

/// Removes a surrounding markdown code fence (with optional language tag)
/// from model output. Text without an opening fence is only trimmed.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Best-effort interpretation of model output. Only a JSON object counts as
/// structured data; everything else keeps the raw output.
pub fn parse_model_output(raw: &str) -> Structured {
    match serde_json::from_str::<Value>(strip_code_fence(raw)) {
        Ok(Value::Object(object)) => Structured::Parsed(object),
        Ok(other) => Structured::Unparsed {
            raw: raw.to_string(),
            reason: format!("expected a JSON object, got {}", json_kind(&other)),
        },
        Err(e) => Structured::Unparsed {
            raw: raw.to_string(),
            reason: e.to_string(),
        },
    }
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
