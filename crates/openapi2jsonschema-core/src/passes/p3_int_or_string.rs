//! Pass 3: Int-or-String Expansion
//!
//! Kubernetes marks fields that accept either a string or an integer with
//! `format: int-or-string`. JSON Schema has no such format, so every mapping
//! carrying it is replaced wholesale by
//! `{oneOf: [{type: string}, {type: integer}]}`. Sibling keys (`type`,
//! `description`, `x-kubernetes-int-or-string`, ...) are discarded.

use serde_json::{json, Value};

/// The Kubernetes format marker.
pub const INT_OR_STRING_FORMAT: &str = "int-or-string";

/// The schema every `int-or-string` mapping is replaced with.
pub fn int_or_string_schema() -> Value {
    json!({ "oneOf": [{ "type": "string" }, { "type": "integer" }] })
}

/// Replace every `format: int-or-string` mapping in the tree.
pub fn int_or_string_expansion(node: Value) -> Value {
    match node {
        Value::Object(obj) => {
            if obj.get("format").and_then(Value::as_str) == Some(INT_OR_STRING_FORMAT) {
                return int_or_string_schema();
            }
            Value::Object(
                obj.into_iter()
                    .map(|(key, value)| (key, int_or_string_expansion(value)))
                    .collect(),
            )
        }
        Value::Array(items) => {
            Value::Array(items.into_iter().map(int_or_string_expansion).collect())
        }
        other => other,
    }
}
