//! Pass 2: Strict Objects
//!
//! For every object schema that declares `properties` but no
//! `additionalProperties`, inject `additionalProperties: false`. This mirrors
//! how `kubectl` validates manifests: unknown fields are rejected.
//!
//! The values of `properties`, `patternProperties` and `definitions` are
//! schemas keyed by name; those name maps are never sealed themselves, so a
//! field called `properties` stays an ordinary field. Schemas inside
//! sequences (`allOf`, `oneOf`, `anyOf` branches) are left open.

use serde_json::{Map, Value};

/// Keywords whose value maps names to schemas.
const NAME_MAPS: &[&str] = &["properties", "patternProperties", "definitions"];

/// Seal every object schema that declares `properties`.
///
/// Idempotent: an already-present `additionalProperties` (injected or
/// authored) is never overwritten.
pub fn additional_properties(node: Value) -> Value {
    match node {
        Value::Object(obj) => Value::Object(seal(obj)),
        other => other,
    }
}

/// Seal every schema of a name map (`definitions`, `properties`), leaving the
/// map's own keys alone.
pub fn additional_properties_of_each(schemas: Map<String, Value>) -> Map<String, Value> {
    schemas
        .into_iter()
        .map(|(name, schema)| (name, additional_properties(schema)))
        .collect()
}

fn seal(mut obj: Map<String, Value>) -> Map<String, Value> {
    if obj.contains_key("properties") && !obj.contains_key("additionalProperties") {
        obj.insert("additionalProperties".to_string(), Value::Bool(false));
    }

    obj.into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Object(child) if NAME_MAPS.contains(&key.as_str()) => {
                    Value::Object(additional_properties_of_each(child))
                }
                Value::Object(child) => Value::Object(seal(child)),
                other => other,
            };
            (key, value)
        })
        .collect()
}
