//! Helpers over decoded values.
//!
//! Decoded values are `serde_json::Value`: a closed union of null, bool,
//! number, string, array and object. Validation pattern-matches on it.

use serde_json::Value;

/// Short name of a decoded value's kind, used in mismatch messages.
pub fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
