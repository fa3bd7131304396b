//! Pass 4: Nullable Optional Fields
//!
//! Kubernetes clients serialize unset optional fields as `null`, so every
//! optional field must also accept `null`. A string-valued `type` becomes
//! `[type, "null"]` unless the field is listed in the `required` array of the
//! object schema that owns it.
//!
//! The owning schema sits two levels above the field's own mapping
//! (`object → properties → field`), so the walk carries the `required` list
//! of both the parent and the grandparent along with the field's key.

use serde_json::{json, Map, Value};

/// Add `"null"` as an allowed type for every optional field.
///
/// Required fields are left exactly as declared. `type: "null"` and
/// already-array types are untouched.
pub fn nullable_optional_fields(node: Value) -> Value {
    walk(node, None, None, None)
}

/// `parent` and `grandparent` hold the `required` names of the enclosing
/// mappings; `None` for a sequence or a mapping without a `required` array.
fn walk(
    node: Value,
    parent: Option<&[String]>,
    grandparent: Option<&[String]>,
    key: Option<&str>,
) -> Value {
    match node {
        Value::Object(obj) => Value::Object(walk_object(obj, parent, grandparent, key)),
        // Items of a sequence keep the sequence's key; their grandparent is
        // the parent of the mapping that holds the sequence.
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| walk(item, None, grandparent, key))
                .collect(),
        ),
        other => other,
    }
}

fn walk_object(
    obj: Map<String, Value>,
    parent: Option<&[String]>,
    grandparent: Option<&[String]>,
    key: Option<&str>,
) -> Map<String, Value> {
    let is_required = match (grandparent, key) {
        (Some(required), Some(key)) => required.iter().any(|name| name == key),
        _ => false,
    };
    let own_required = required_names(&obj);

    obj.into_iter()
        .map(|(k, v)| {
            let v = match v {
                Value::String(type_name) if k == "type" && type_name != "null" && !is_required => {
                    json!([type_name, "null"])
                }
                other => walk(other, own_required.as_deref(), parent, Some(k.as_str())),
            };
            (k, v)
        })
        .collect()
}

fn required_names(obj: &Map<String, Value>) -> Option<Vec<String>> {
    obj.get("required").and_then(Value::as_array).map(|names| {
        names
            .iter()
            .filter_map(Value::as_str)
            .map(String::from)
            .collect()
    })
}
