//! Convert OpenAPI 2 ("Swagger") and OpenAPI 3 documents into standalone
//! JSON Schema files.
//!
//! The library is pure: it takes a parsed document tree and returns the
//! trees to write. Loading and writing live in the CLI.
//!
//! ```rust
//! use openapi2jsonschema_core::{convert, ConvertOptions};
//! use serde_json::json;
//!
//! let document = json!({
//!     "openapi": "3.0.0",
//!     "paths": {},
//!     "components": {
//!         "schemas": {
//!             "Pet": {
//!                 "type": "object",
//!                 "properties": { "category": { "$ref": "#/components/schemas/Category" } }
//!             },
//!             "Category": { "type": "object", "nullable": true }
//!         }
//!     }
//! });
//!
//! let output = convert(document, &ConvertOptions::default()).unwrap();
//! let pet = output.get("pet.json").unwrap();
//! assert_eq!(pet["properties"]["category"]["$ref"], "Category.json");
//! let category = output.get("category.json").unwrap();
//! assert_eq!(category["type"], json!(["object", "null"]));
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod extract;
pub mod kubernetes;
pub mod output;
pub mod passes;
pub mod schema_utils;
pub mod standalone;

use serde_json::Value;

pub use config::ConvertOptions;
pub use document::{SchemaDocument, SpecVersion};
pub use error::ConvertError;
pub use output::{build_output, ComponentFailure, OutputFile, OutputSet};
pub use schema_utils::{append_unique, build_path, escape_pointer_segment, resolve_pointer};

/// Convert a parsed OpenAPI document into its output files.
///
/// # Errors
///
/// [`ConvertError::MissingVersion`] when the document declares no version,
/// plus any document-level error from [`build_output`].
pub fn convert(document: Value, options: &ConvertOptions) -> Result<OutputSet, ConvertError> {
    let document = SchemaDocument::from_value(document)?;
    build_output(&document, options)
}
