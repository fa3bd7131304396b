//! Pass 1: Reference Rewriting & `nullable` Keyword
//!
//! One traversal, keyed by the document's [`SpecVersion`], that:
//!
//! 1. Rewrites every `$ref` string so it addresses an output file:
//!    - Swagger 2: `prefix + ref` verbatim (`#/definitions/Pod` →
//!      `_definitions.json#/definitions/Pod`)
//!    - OpenAPI 3: `#/components/schemas/` stripped, `.json` appended
//!      (`#/components/schemas/Pet` → `Pet.json`)
//! 2. Folds the OpenAPI 3 `nullable: true` keyword into the `type` array
//!    (`{type: object, nullable: true}` → `{type: [object, null]}`).
//!
//! Must run after component extraction so synthesized names are final.

use serde_json::{Map, Value};

use crate::document::SpecVersion;

/// The fragment prefix OpenAPI 3 schema refs carry.
pub const COMPONENT_SCHEMAS_PREFIX: &str = "#/components/schemas/";

/// Rewrite refs and fold `nullable` across the whole tree.
///
/// Scalars pass through unchanged.
pub fn rewrite_refs(node: Value, prefix: &str, version: SpecVersion) -> Value {
    match node {
        Value::Object(obj) => rewrite_object(obj, prefix, version),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| rewrite_refs(item, prefix, version))
                .collect(),
        ),
        other => other,
    }
}

/// Rewrite a single `$ref` string for the given schema version.
pub fn rewrite_ref(reference: &str, prefix: &str, version: SpecVersion) -> String {
    match version {
        SpecVersion::Swagger2 => format!("{prefix}{reference}"),
        SpecVersion::OpenApi3 => {
            format!("{}.json", reference.replace(COMPONENT_SCHEMAS_PREFIX, ""))
        }
    }
}

fn rewrite_object(obj: Map<String, Value>, prefix: &str, version: SpecVersion) -> Value {
    let mut nullable = false;
    let mut result = Map::with_capacity(obj.len());

    for (key, value) in obj {
        // The boolean keyword is consumed here; a property *named* `nullable`
        // carries a schema object and is recursed into like any other.
        if key == "nullable" {
            if let Value::Bool(flag) = value {
                nullable = flag;
                continue;
            }
        }

        let rewritten = match value {
            Value::String(reference) if key == "$ref" => {
                Value::String(rewrite_ref(&reference, prefix, version))
            }
            other => rewrite_refs(other, prefix, version),
        };
        result.insert(key, rewritten);
    }

    if nullable {
        if let Some(type_val) = result.get_mut("type") {
            allow_null_type(type_val);
        }
    }

    Value::Object(result)
}

/// Coerce `type` to a sequence and append `"null"` once.
fn allow_null_type(type_val: &mut Value) {
    let mut types = match type_val.take() {
        Value::Array(types) => types,
        single => vec![single],
    };
    if !types.iter().any(|t| t.as_str() == Some("null")) {
        types.push(Value::String("null".to_string()));
    }
    *type_val = Value::Array(types);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use crate::config::DEFAULT_PREFIX;

    fn v3(schema: Value) -> Value {
        rewrite_refs(schema, DEFAULT_PREFIX, SpecVersion::OpenApi3)
    }

    #[test]
    fn test_v3_ref_becomes_file_name() {
        let input = json!({
            "type": "object",
            "properties": {
                "category": { "$ref": "#/components/schemas/Category" }
            }
        });

        assert_eq!(v3(input)["properties"]["category"]["$ref"], json!("Category.json"));
    }

    #[test]
    fn test_v2_ref_is_prefixed_verbatim() {
        let input = json!({ "items": { "$ref": "#/definitions/Category" } });
        let output = rewrite_refs(input, DEFAULT_PREFIX, SpecVersion::Swagger2);
        assert_eq!(
            output["items"]["$ref"],
            json!("_definitions.json#/definitions/Category")
        );
    }

    #[test]
    fn test_v2_prefix_keeps_fragment_marker() {
        let output = rewrite_refs(
            json!({ "$ref": "#/definitions/Category" }),
            "_definitions.json#/definitions/",
            SpecVersion::Swagger2,
        );
        assert_eq!(
            output["$ref"],
            json!("_definitions.json#/definitions/#/definitions/Category")
        );
    }

    #[test]
    fn test_refs_inside_sequences() {
        let input = json!({
            "oneOf": [
                { "$ref": "#/components/schemas/Cat" },
                { "$ref": "#/components/schemas/Dog" }
            ]
        });
        assert_eq!(
            v3(input),
            json!({ "oneOf": [{ "$ref": "Cat.json" }, { "$ref": "Dog.json" }] })
        );
    }

    #[test]
    fn test_nullable_scalar_type() {
        let input = json!({ "type": "object", "nullable": true });
        assert_eq!(v3(input), json!({ "type": ["object", "null"] }));
    }

    #[test]
    fn test_nullable_type_array_not_duplicated() {
        let input = json!({ "type": ["string", "null"], "nullable": true });
        assert_eq!(v3(input), json!({ "type": ["string", "null"] }));
    }

    #[test]
    fn test_nullable_false_is_dropped_without_change() {
        let input = json!({ "type": "string", "nullable": false });
        assert_eq!(v3(input), json!({ "type": "string" }));
    }

    #[test]
    fn test_nullable_without_type_leaves_schema_alone() {
        let input = json!({ "allOf": [{ "$ref": "#/components/schemas/Pet" }], "nullable": true });
        assert_eq!(v3(input), json!({ "allOf": [{ "$ref": "Pet.json" }] }));
    }

    #[test]
    fn test_nested_nullable_is_local_to_its_mapping() {
        let input = json!({
            "type": "object",
            "properties": {
                "tag": { "type": "string", "nullable": true },
                "name": { "type": "string" }
            }
        });
        assert_eq!(
            v3(input),
            json!({
                "type": "object",
                "properties": {
                    "tag": { "type": ["string", "null"] },
                    "name": { "type": "string" }
                }
            })
        );
    }

    #[test]
    fn test_property_named_nullable_is_kept() {
        let input = json!({
            "type": "object",
            "properties": { "nullable": { "type": "boolean" } }
        });
        assert_eq!(v3(input.clone()), input);
    }

    #[test]
    fn test_scalar_passes_through() {
        assert_eq!(v3(json!("#/components/schemas/Pet")), json!("#/components/schemas/Pet"));
        assert_eq!(v3(json!(42)), json!(42));
    }

    #[test]
    fn test_key_order_preserved() {
        let input = json!({ "b": 1, "nullable": true, "type": "integer", "a": 2 });
        let output = v3(input);
        let keys: Vec<&str> = output.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "type", "a"]);
    }
}
