//! Feature property decoding.
//!
//! Vector tile and GeoJSON sources flatten nested property objects into JSON
//! strings by the time a hit-test reports them. Values that look like a JSON
//! object are parsed back; everything else is passed through untouched.

use serde_json::{Map, Value};
use tracing::trace;

/// Shape check only: the value must start with `{` and end with `}`.
///
/// Arrays and whitespace-padded objects are deliberately not matched.
pub fn looks_like_object(raw: &str) -> bool {
    raw.starts_with('{') && raw.ends_with('}')
}

/// Best-effort decode of a single property value.
///
/// Never fails: a string that does not parse is returned as-is. Non-string
/// values are returned unchanged, so decoding is idempotent.
pub fn decode_value(value: Value) -> Value {
    let Value::String(raw) = value else {
        return value;
    };
    if !looks_like_object(&raw) {
        return Value::String(raw);
    }
    match serde_json::from_str::<Value>(&raw) {
        Ok(parsed) => parsed,
        Err(err) => {
            trace!("keeping raw property value: {err}");
            Value::String(raw)
        }
    }
}

/// Decodes every property independently, preserving keys.
pub fn decode_properties(properties: Map<String, Value>) -> Map<String, Value> {
    properties
        .into_iter()
        .map(|(k, v)| (k, decode_value(v)))
        .collect()
}
