//! Shared tree-walk utilities.
//!
//! Two concerns used across extraction, the passes, and output assembly:
//! 1. **JSON Pointer handling** (RFC 6901) for error locations and for
//!    resolving fragments during stand-alone inlining
//! 2. **Order-preserving set accumulation** on JSON sequences

use std::borrow::Cow;

use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// JSON Pointer (RFC 6901)
// ---------------------------------------------------------------------------

/// Escape a single path segment per RFC 6901.
///
/// Returns `Cow::Borrowed` when no escaping is needed (the common case).
pub fn escape_pointer_segment(segment: &str) -> Cow<'_, str> {
    if segment.contains('~') || segment.contains('/') {
        Cow::Owned(segment.replace('~', "~0").replace('/', "~1"))
    } else {
        Cow::Borrowed(segment)
    }
}

/// Build a JSON Pointer path by appending escaped segments to a parent path.
///
/// # Example
/// ```
/// use openapi2jsonschema_core::build_path;
/// assert_eq!(build_path("#", &["paths", "/pets/{id}", "get"]), "#/paths/~1pets~1{id}/get");
/// ```
pub fn build_path(parent: &str, segments: &[&str]) -> String {
    let mut path = parent.to_string();
    for segment in segments {
        path.push('/');
        path.push_str(&escape_pointer_segment(segment));
    }
    path
}

/// Split a JSON Pointer into decoded segments.
///
/// Strips the leading `#` (if present). `~1` is unescaped before `~0`.
pub fn split_path(path: &str) -> Vec<String> {
    let stripped = path.strip_prefix('#').unwrap_or(path);
    if stripped.is_empty() {
        return Vec::new();
    }

    let mut segments = stripped.split('/');
    if stripped.starts_with('/') {
        segments.next();
    }

    segments
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect()
}

/// Resolve a JSON Pointer against a document.
///
/// Supports `#`, `#/definitions/Pod`, `/definitions/Pod/properties/spec`.
pub fn resolve_pointer<'a>(root: &'a Value, pointer: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in split_path(pointer) {
        current = match current {
            Value::Object(obj) => obj.get(&segment)?,
            Value::Array(arr) => arr.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

// ---------------------------------------------------------------------------
// Set-like accumulation
// ---------------------------------------------------------------------------

/// Append `value` to the sequence at `registry[key]` unless already present.
///
/// The sequence is created empty when `key` is absent. A non-sequence value
/// under `key` is replaced by a fresh sequence. Equality is structural, so
/// the collection keeps first-insertion order without duplicates.
pub fn append_unique(registry: &mut Map<String, Value>, key: &str, value: Value) {
    let entry = registry
        .entry(key.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if !entry.is_array() {
        *entry = Value::Array(Vec::new());
    }
    if let Value::Array(items) = entry {
        if !items.contains(&value) {
            items.push(value);
        }
    }
}
