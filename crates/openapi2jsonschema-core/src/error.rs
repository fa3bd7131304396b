//! Error types for document conversion.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("Document declares neither a `swagger` nor an `openapi` version")]
    MissingVersion,

    #[error("Missing required field `{field}` at {path}")]
    MissingField { path: String, field: String },

    #[error("Unresolvable $ref at {path}: {reference}")]
    UnresolvableRef { path: String, reference: String },

    #[error("Recursive $ref at {path}: {reference}")]
    RecursiveRef { path: String, reference: String },

    #[error("Duplicate operationId `{operation_id}` at {path}")]
    DuplicateOperationId { operation_id: String, path: String },

    #[error("Recursion depth exceeded at {path} (max: {max_depth})")]
    RecursionDepthExceeded { path: String, max_depth: usize },

    #[error("{name} not currently supported: {reason}")]
    UnsupportedComponent { name: String, reason: String },

    #[error("Schema error at {path}: {message}")]
    SchemaError { path: String, message: String },
}

impl ConvertError {
    pub(crate) fn missing(path: &str, field: &str) -> Self {
        ConvertError::MissingField {
            path: path.to_string(),
            field: field.to_string(),
        }
    }
}
