//! Stand-alone inlining: replace every `$ref` with the tree it points at.
//!
//! After [`crate::passes::p1_refs`] a ref addresses an output file
//! (`Pet.json`, `_definitions.json#/definitions/io.k8s.api.core.v1.PodSpec`).
//! [`RefResolver`] holds those files in memory, so inlining needs no I/O.
//!
//! Inlined targets are themselves inlined (chains `A → B → C` collapse). A
//! ref that is reached again while its own target is being expanded is a
//! cycle and cannot be written as a finite tree.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::ConvertError;
use crate::schema_utils::{build_path, resolve_pointer};

/// In-memory view of the output files a rewritten `$ref` can point into.
#[derive(Debug, Clone, Default)]
pub struct RefResolver {
    files: Map<String, Value>,
}

impl RefResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the (already ref-rewritten) content of an output file.
    pub fn insert(&mut self, file_name: impl Into<String>, document: Value) {
        self.files.insert(file_name.into(), document);
    }

    /// Resolve `file.json` or `file.json#/json/pointer`.
    pub fn resolve(&self, reference: &str) -> Option<&Value> {
        let (file_name, pointer) = reference.split_once('#').unwrap_or((reference, ""));
        resolve_pointer(self.files.get(file_name)?, pointer)
    }
}

/// Traversal state for one inlining run.
struct InlineContext<'a> {
    resolver: &'a RefResolver,
    max_depth: usize,
    visiting: HashSet<String>,
}

/// Inline every `$ref` in `schema`.
///
/// A mapping holding `$ref` is replaced by its target; sibling keywords are
/// dropped, as draft-4 validators ignore them.
///
/// # Errors
///
/// - [`ConvertError::UnresolvableRef`] when a target file or pointer is missing
/// - [`ConvertError::RecursiveRef`] when a ref (indirectly) contains itself
/// - [`ConvertError::RecursionDepthExceeded`] after `max_depth` nested refs
pub fn inline_refs(
    schema: Value,
    resolver: &RefResolver,
    max_depth: usize,
) -> Result<Value, ConvertError> {
    let mut ctx = InlineContext {
        resolver,
        max_depth,
        visiting: HashSet::new(),
    };
    inline(schema, "#", 0, &mut ctx)
}

/// `depth` counts followed refs, not nesting levels.
fn inline(
    node: Value,
    path: &str,
    depth: usize,
    ctx: &mut InlineContext<'_>,
) -> Result<Value, ConvertError> {
    match node {
        Value::Object(obj) => {
            if let Some(reference) = obj.get("$ref").and_then(Value::as_str) {
                return inline_ref(reference, path, depth, ctx);
            }
            let mut result = Map::with_capacity(obj.len());
            for (key, value) in obj {
                let child_path = build_path(path, &[&key]);
                let inlined = inline(value, &child_path, depth, ctx)?;
                result.insert(key, inlined);
            }
            Ok(Value::Object(result))
        }
        Value::Array(items) => {
            let mut result = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                let child_path = build_path(path, &[&i.to_string()]);
                result.push(inline(item, &child_path, depth, ctx)?);
            }
            Ok(Value::Array(result))
        }
        other => Ok(other),
    }
}

fn inline_ref(
    reference: &str,
    path: &str,
    depth: usize,
    ctx: &mut InlineContext<'_>,
) -> Result<Value, ConvertError> {
    if depth >= ctx.max_depth {
        return Err(ConvertError::RecursionDepthExceeded {
            path: path.to_string(),
            max_depth: ctx.max_depth,
        });
    }
    if ctx.visiting.contains(reference) {
        return Err(ConvertError::RecursiveRef {
            path: path.to_string(),
            reference: reference.to_string(),
        });
    }

    let target = ctx
        .resolver
        .resolve(reference)
        .cloned()
        .ok_or_else(|| ConvertError::UnresolvableRef {
            path: path.to_string(),
            reference: reference.to_string(),
        })?;

    tracing::trace!(path, reference, "inlining $ref");
    ctx.visiting.insert(reference.to_string());
    let resolved = inline(target, path, depth + 1, ctx);
    ctx.visiting.remove(reference);
    resolved
}
