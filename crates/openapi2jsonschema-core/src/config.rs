//! Configuration for document conversion.

use serde::{Deserialize, Serialize};

/// Default prefix prepended to OpenAPI 2 `$ref` strings.
pub const DEFAULT_PREFIX: &str = "_definitions.json";

/// Options for document conversion.
///
/// ## Serialization Format
///
/// Fields are serialized in `kebab-case` (e.g., `stand-alone`, `include-bodies`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct ConvertOptions {
    /// Prefix prepended verbatim to every OpenAPI 2 `$ref`.
    /// Default: `_definitions.json`.
    pub prefix: String,
    /// Apply Kubernetes conventions: int-or-string and Quantity unions,
    /// `apiVersion`/`kind` enums, nullable optional fields, and
    /// `kind-group-version` file names when `expanded` is also set.
    pub kubernetes: bool,
    /// Inject `additionalProperties: false` into every object schema that
    /// declares `properties`.
    pub strict: bool,
    /// Include group and version in Kubernetes file names.
    pub expanded: bool,
    /// Inline every `$ref` so each emitted file has no external references.
    pub stand_alone: bool,
    /// Extract request/response bodies and parameter bundles from `paths`
    /// (OpenAPI 3 only).
    pub include_bodies: bool,
    /// Maximum nesting depth while inlining refs in stand-alone mode.
    pub max_depth: usize,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            kubernetes: false,
            strict: false,
            expanded: false,
            stand_alone: false,
            include_bodies: false,
            max_depth: 50,
        }
    }
}
