//! Parsed OpenAPI / Swagger documents.

use std::fmt;

use serde_json::{Map, Value};

use crate::error::ConvertError;

/// Schema dialect of the source document.
///
/// Versions are compared as strings, so `"2.0"` and `"1.2"` are Swagger 2
/// while `"3.0.3"` and `"3.1.0"` are OpenAPI 3.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecVersion {
    /// `definitions` / `parameters`, fragment refs into `_definitions.json`.
    Swagger2,
    /// `components.schemas` / `components.parameters`, one file per schema.
    OpenApi3,
}

impl SpecVersion {
    /// Classify a raw `swagger` / `openapi` version string.
    pub fn from_version_str(version: &str) -> Self {
        if version < "3" {
            SpecVersion::Swagger2
        } else {
            SpecVersion::OpenApi3
        }
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecVersion::Swagger2 => write!(f, "2"),
            SpecVersion::OpenApi3 => write!(f, "3.x"),
        }
    }
}

/// An OpenAPI document held in memory for the whole run.
#[derive(Debug, Clone)]
pub struct SchemaDocument {
    root: Map<String, Value>,
    version: String,
    spec_version: SpecVersion,
}

impl SchemaDocument {
    /// Wrap a parsed document tree.
    ///
    /// The version comes from `swagger` first, then `openapi`. A numeric
    /// version (unquoted `swagger: 2.0` in YAML) is read as its decimal text.
    pub fn from_value(value: Value) -> Result<Self, ConvertError> {
        let Value::Object(root) = value else {
            return Err(ConvertError::SchemaError {
                path: "#".to_string(),
                message: "document root must be a mapping".to_string(),
            });
        };

        let version = match root.get("swagger").or_else(|| root.get("openapi")) {
            Some(Value::String(version)) => version.clone(),
            Some(Value::Number(version)) => version.to_string(),
            _ => return Err(ConvertError::MissingVersion),
        };
        let spec_version = SpecVersion::from_version_str(&version);

        Ok(Self {
            root,
            version,
            spec_version,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn spec_version(&self) -> SpecVersion {
        self.spec_version
    }

    /// The `paths` mapping, empty when absent.
    pub fn paths(&self) -> Map<String, Value> {
        self.object_at(&["paths"])
    }

    /// Swagger 2 `definitions`, empty when absent.
    pub fn definitions(&self) -> Map<String, Value> {
        self.object_at(&["definitions"])
    }

    /// OpenAPI 3 `components.schemas`, empty when absent.
    pub fn component_schemas(&self) -> Map<String, Value> {
        self.object_at(&["components", "schemas"])
    }

    /// OpenAPI 3 `components.parameters`, empty when absent.
    pub fn component_parameters(&self) -> Map<String, Value> {
        self.object_at(&["components", "parameters"])
    }

    fn object_at(&self, keys: &[&str]) -> Map<String, Value> {
        let mut current = self.root.get(keys[0]);
        for key in &keys[1..] {
            current = current.and_then(|v| v.get(key));
        }
        current
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default()
    }
}
