//! Kubernetes conventions layered over Swagger 2 definitions.
//!
//! - `IntOrString` and `Quantity` are declared as `type: string` upstream but
//!   accept numbers in practice; both become `oneOf` unions.
//! - `x-kubernetes-group-version-kind` is turned into `enum` constraints on
//!   `apiVersion` and `kind`, so a manifest is matched to exactly one schema.
//! - Titles such as `io.k8s.api.apps.v1.Deployment` name files
//!   `deployment-apps-v1.json` (expanded) or `deployment.json`.

use serde_json::{json, Map, Value};

use crate::error::ConvertError;
use crate::passes::p3_int_or_string::int_or_string_schema;
use crate::schema_utils::append_unique;

pub const INT_OR_STRING_DEFINITION: &str = "io.k8s.apimachinery.pkg.util.intstr.IntOrString";
pub const QUANTITY_DEFINITION: &str = "io.k8s.apimachinery.pkg.api.resource.Quantity";

const GROUP_VERSION_KIND: &str = "x-kubernetes-group-version-kind";

/// Groups whose resources are named without a group segment.
const CORE_GROUPS: &[&str] = &["core", "api"];

/// Kinds that embed JSON Schema themselves and recurse without bound once
/// inlined.
const UNSUPPORTED_STAND_ALONE_KINDS: &[&str] = &[
    "jsonschemaprops",
    "jsonschemapropsorarray",
    "customresourcevalidation",
    "customresourcedefinition",
    "customresourcedefinitionspec",
    "customresourcedefinitionlist",
    "jsonschemapropsorstringarray",
    "jsonschemapropsorbool",
];

/// Add the union types and `apiVersion` / `kind` enums to every definition.
///
/// `apiVersion` enums are only populated when `expanded`, since an unexpanded
/// file (`deployment.json`) is shared by several API versions.
pub fn augment_definitions(mut definitions: Map<String, Value>, expanded: bool) -> Map<String, Value> {
    definitions.insert(INT_OR_STRING_DEFINITION.to_string(), int_or_string_schema());
    // Quantity is a string upstream, but nearly all tooling accepts numbers.
    definitions.insert(
        QUANTITY_DEFINITION.to_string(),
        json!({ "oneOf": [{ "type": "string" }, { "type": "number" }] }),
    );

    for definition in definitions.values_mut() {
        let Some(definition) = definition.as_object_mut() else {
            continue;
        };
        let group_version_kinds = definition
            .get(GROUP_VERSION_KIND)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        let Some(properties) = definition
            .get_mut("properties")
            .and_then(Value::as_object_mut)
        else {
            continue;
        };

        for gvk in &group_version_kinds {
            if expanded {
                if let Some(Value::Object(api_version)) = properties.get_mut("apiVersion") {
                    append_unique(api_version, "enum", Value::String(api_version_of(gvk)));
                }
            }
            if let (Some(Value::Object(kind)), Some(name)) = (
                properties.get_mut("kind"),
                gvk.get("kind").and_then(Value::as_str),
            ) {
                append_unique(kind, "enum", Value::String(name.to_string()));
            }
        }
    }

    definitions
}

/// `group/version`, or the bare version for the core group (`""`).
fn api_version_of(gvk: &Value) -> String {
    let group = gvk.get("group").and_then(Value::as_str).unwrap_or_default();
    let version = gvk.get("version").and_then(Value::as_str).unwrap_or_default();
    if group.is_empty() {
        version.to_string()
    } else {
        format!("{group}/{version}")
    }
}

/// Lower-cased last dotted segment of a component title.
pub fn kind_of(title: &str) -> String {
    title.rsplit('.').next().unwrap_or(title).to_lowercase()
}

/// File stem for a Kubernetes definition title.
///
/// `io.k8s.api.apps.v1.Deployment` → `deployment-apps-v1` when `expanded`,
/// `deployment` otherwise. Core-group titles drop the group
/// (`io.k8s.api.core.v1.Pod` → `pod-v1`).
///
/// # Errors
///
/// [`ConvertError::UnsupportedComponent`] for titles with fewer than three
/// dotted segments.
pub fn file_stem(title: &str, expanded: bool) -> Result<String, ConvertError> {
    let segments: Vec<&str> = title.split('.').collect();
    let [.., group, version, kind] = segments.as_slice() else {
        return Err(ConvertError::UnsupportedComponent {
            name: title.to_string(),
            reason: "expected a `<group>.<version>.<Kind>` title".to_string(),
        });
    };
    let kind = kind.to_lowercase();
    if !expanded {
        return Ok(kind);
    }

    let group = group.to_lowercase();
    let version = version.to_lowercase();
    if CORE_GROUPS.contains(&group.as_str()) {
        Ok(format!("{kind}-{version}"))
    } else {
        Ok(format!("{kind}-{group}-{version}"))
    }
}

/// Reject definitions that cannot be converted.
///
/// `io.k8s.kubernetes.pkg.*` holds deprecated aliases; the JSONSchemaProps
/// family recurses without bound when inlined.
pub fn check_supported(title: &str, stand_alone: bool) -> Result<(), ConvertError> {
    let segments: Vec<&str> = title.split('.').collect();
    if segments.get(2) == Some(&"kubernetes") && segments.get(3) == Some(&"pkg") {
        return Err(ConvertError::UnsupportedComponent {
            name: title.to_string(),
            reason: "deprecated pkg namespace".to_string(),
        });
    }

    let kind = kind_of(title);
    if stand_alone && UNSUPPORTED_STAND_ALONE_KINDS.contains(&kind.as_str()) {
        return Err(ConvertError::UnsupportedComponent {
            name: kind,
            reason: "embeds recursive JSON Schema".to_string(),
        });
    }

    Ok(())
}
