//! Error types for document generation and serving.

use thiserror::Error;

/// Errors that can occur while producing or serving documentation.
#[derive(Debug, Error)]
pub enum DocsError {
    /// Failed to serialize the OpenAPI document to JSON.
    #[error("Failed to serialize OpenAPI document: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A documentation mount path that cannot be routed.
    #[error("Invalid docs path '{path}': {reason}")]
    InvalidPath {
        /// The rejected path.
        path: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for documentation operations.
pub type DocsResult<T> = Result<T, DocsError>;
