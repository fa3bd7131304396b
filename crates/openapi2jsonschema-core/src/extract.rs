//! Component extraction from `paths`.
//!
//! OpenAPI 3 documents leave request bodies, response bodies and parameter
//! lists inline on each operation. The file-per-schema output model needs
//! them as named components, so this module synthesizes them:
//!
//! - [`body_components`]: one component per `(path, method, role, media type)`,
//!   named `paths_<path>_<method>_<role>_<type>`
//! - [`parameter_components`]: one component per operation, keyed by
//!   `operationId`, bundling every parameter as a property
//!
//! ## Naming
//!
//! ```rust
//! use openapi2jsonschema_core::extract::body_name_prefix;
//!
//! assert_eq!(
//!     body_name_prefix("/pets/{id}", "get", "response_200"),
//!     "paths_pets__id__get_response_200_"
//! );
//! assert_eq!(body_name_prefix("/", "get", "request"), "paths_root_get_request_");
//! ```
//!
//! `/` and `/root` produce the same prefix; documents declaring both collide.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::error::ConvertError;
use crate::passes::p1_refs::COMPONENT_SCHEMAS_PREFIX;
use crate::schema_utils::{append_unique, build_path};

/// Fragment prefix of OpenAPI 3 parameter refs.
pub const COMPONENT_PARAMETERS_PREFIX: &str = "#/components/parameters/";

/// Path-item keys that hold operations. Everything else on a path item
/// (`parameters`, `summary`, `servers`, `x-*`) is skipped.
const HTTP_METHODS: &[&str] = &[
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Path-template parameters (`{id}`); `{name:regex}` forms are left alone.
static TEMPLATE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^:}]+)\}").expect("template pattern is a valid regex"));

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

/// Build the component-name prefix for one body of one operation.
///
/// Leading slashes are stripped, remaining slashes become `_`, an empty path
/// becomes `root`, and template braces `{x}` become `_x_`.
pub fn body_name_prefix(path: &str, method: &str, role: &str) -> String {
    let stem = path.trim_start_matches('/').replace('/', "_");
    let stem = if stem.is_empty() { "root" } else { stem.as_str() };
    let prefix = format!("paths_{stem}_{method}_{role}_");
    TEMPLATE_PARAM.replace_all(&prefix, "_${1}_").into_owned()
}

/// Short, filesystem-safe token for a media type.
pub fn mime_type_token(mime_type: &str) -> Cow<'_, str> {
    match mime_type {
        "application/json" => Cow::Borrowed("json"),
        "application/vnd.api+json" => Cow::Borrowed("jsonapi"),
        other => Cow::Owned(other.replace('/', "_")),
    }
}

// ---------------------------------------------------------------------------
// Body components
// ---------------------------------------------------------------------------

/// Synthesize a component for every request and response body schema.
///
/// Request bodies use role `request`, responses `response_<code>`; the
/// registry key is the prefix followed by the media type token. Media types
/// without a `schema` are skipped.
///
/// # Errors
///
/// [`ConvertError::MissingField`] when an operation has no `responses`.
pub fn body_components(paths: &Map<String, Value>) -> Result<Map<String, Value>, ConvertError> {
    let mut components = Map::new();

    for (path, method, operation) in operations(paths) {
        let operation_path = build_path("#/paths", &[path, method]);

        if let Some(request_body) = operation.get("requestBody") {
            let prefix = body_name_prefix(path, method, "request");
            components.extend(body_schemas(request_body, &prefix));
        }

        let responses = operation
            .get("responses")
            .and_then(Value::as_object)
            .ok_or_else(|| ConvertError::missing(&operation_path, "responses"))?;
        for (code, response) in responses {
            let prefix = body_name_prefix(path, method, &format!("response_{code}"));
            components.extend(body_schemas(response, &prefix));
        }
    }

    tracing::debug!(count = components.len(), "extracted body components");
    Ok(components)
}

/// One `(name, schema)` pair per media type of a request body or response.
fn body_schemas<'a>(
    body: &'a Value,
    prefix: &'a str,
) -> impl Iterator<Item = (String, Value)> + 'a {
    body.get("content")
        .and_then(Value::as_object)
        .into_iter()
        .flatten()
        .filter_map(move |(mime_type, media)| {
            media
                .get("schema")
                .map(|schema| (format!("{prefix}{}", mime_type_token(mime_type)), schema.clone()))
        })
}

// ---------------------------------------------------------------------------
// Parameter components
// ---------------------------------------------------------------------------

/// Synthesize one component per operation bundling its parameters.
///
/// Each component has `properties` (parameter name → `{in, ...schema}`),
/// `required` (names of `required: true` parameters, omitted when empty) and,
/// when the operation has a JSON request body, `requestBody` naming the file
/// that holds the body schema.
///
/// # Errors
///
/// - [`ConvertError::MissingField`] for an operation without `operationId`,
///   or a parameter without `name` / `in`
/// - [`ConvertError::UnresolvableRef`] for a parameter `$ref` absent from
///   `parameters`
/// - [`ConvertError::DuplicateOperationId`] when two operations share an id
pub fn parameter_components(
    paths: &Map<String, Value>,
    parameters: &Map<String, Value>,
) -> Result<Map<String, Value>, ConvertError> {
    let mut components = Map::new();

    for (path, method, operation) in operations(paths) {
        let operation_path = build_path("#/paths", &[path, method]);
        let operation_id = operation
            .get("operationId")
            .and_then(Value::as_str)
            .ok_or_else(|| ConvertError::missing(&operation_path, "operationId"))?;

        if components.contains_key(operation_id) {
            return Err(ConvertError::DuplicateOperationId {
                operation_id: operation_id.to_string(),
                path: operation_path,
            });
        }

        let component =
            parameter_component(path, method, operation, parameters, &operation_path)?;
        components.insert(operation_id.to_string(), Value::Object(component));
    }

    tracing::debug!(count = components.len(), "extracted parameter components");
    Ok(components)
}

fn parameter_component(
    path: &str,
    method: &str,
    operation: &Map<String, Value>,
    parameters: &Map<String, Value>,
    operation_path: &str,
) -> Result<Map<String, Value>, ConvertError> {
    let mut component = Map::new();

    if let Some(declared) = operation.get("parameters").and_then(Value::as_array) {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for (i, param) in declared.iter().enumerate() {
            let param_path = build_path(operation_path, &["parameters", &i.to_string()]);
            let param = resolve_parameter(param, parameters, &param_path)?;

            let name = param
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| ConvertError::missing(&param_path, "name"))?;
            let location = param
                .get("in")
                .cloned()
                .ok_or_else(|| ConvertError::missing(&param_path, "in"))?;

            let mut property = Map::new();
            property.insert("in".to_string(), location);
            if let Some(schema) = param.get("schema").and_then(Value::as_object) {
                property.extend(schema.iter().map(|(k, v)| (k.clone(), v.clone())));
            }
            properties.insert(name.to_string(), Value::Object(property));

            if param.get("required").and_then(Value::as_bool) == Some(true) {
                required.push(name.to_string());
            }
        }

        component.insert("properties".to_string(), Value::Object(properties));
        for name in required {
            append_unique(&mut component, "required", Value::String(name));
        }
    }

    if let Some(reference) = request_body_reference(path, method, operation) {
        component.insert("requestBody".to_string(), Value::String(reference));
    }

    Ok(component)
}

/// Follow a `#/components/parameters/<name>` ref; inline parameters are
/// returned as-is.
fn resolve_parameter<'a>(
    param: &'a Value,
    parameters: &'a Map<String, Value>,
    param_path: &str,
) -> Result<&'a Value, ConvertError> {
    let Some(reference) = param.get("$ref").and_then(Value::as_str) else {
        return Ok(param);
    };
    let name = reference.replace(COMPONENT_PARAMETERS_PREFIX, "");
    parameters
        .get(&name)
        .ok_or_else(|| ConvertError::UnresolvableRef {
            path: param_path.to_string(),
            reference: reference.to_string(),
        })
}

/// Lower-cased file name of the operation's JSON request body schema.
///
/// A `$ref` body points at the referenced schema's file; an inline body
/// points at the component [`body_components`] synthesizes for it.
fn request_body_reference(
    path: &str,
    method: &str,
    operation: &Map<String, Value>,
) -> Option<String> {
    let schema = operation
        .get("requestBody")?
        .get("content")?
        .get("application/json")?
        .get("schema")?;

    let file_name = match schema.get("$ref").and_then(Value::as_str) {
        Some(reference) => format!("{}.json", reference.replace(COMPONENT_SCHEMAS_PREFIX, "")),
        None => format!("{}json.json", body_name_prefix(path, method, "request")),
    };
    Some(file_name.to_lowercase())
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// Every `(path, method, operation)` triple in declaration order.
fn operations(
    paths: &Map<String, Value>,
) -> impl Iterator<Item = (&str, &str, &Map<String, Value>)> {
    paths
        .iter()
        .filter_map(|(path, item)| item.as_object().map(|item| (path.as_str(), item)))
        .flat_map(|(path, item)| {
            item.iter()
                .filter(|(method, _)| HTTP_METHODS.contains(&method.as_str()))
                .filter_map(move |(method, op)| {
                    op.as_object().map(|op| (path, method.as_str(), op))
                })
        })
}
