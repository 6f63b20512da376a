//! Tolerant field decoders for oracle-produced JSON.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `null` decodes as an empty string.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any JSON value as text: strings verbatim, `null` empty, everything else
/// rendered as compact JSON.
pub(crate) fn any_as_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(render(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Like `any_as_text`, but `null` stays `None`.
pub(crate) fn any_as_text_opt<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(render(Value::deserialize(deserializer)?))
}

fn render(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
