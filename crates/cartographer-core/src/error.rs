//! Error types for Cartographer core.

use thiserror::Error;

use crate::issue::SchemaError;

/// Result type alias using [`CoreError`].
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors raised by the core request model and schema engine.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A value did not conform to a schema.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Request data could not be deserialized into the requested type.
    #[error("failed to deserialize request {target}: {source}")]
    Deserialize {
        /// Which part of the request was read (`body` or `query`).
        target: &'static str,
        /// The underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// A response payload could not be serialized.
    #[error("failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl CoreError {
    /// Creates a deserialization error for the given request part.
    #[must_use]
    pub fn deserialize(target: &'static str, source: serde_json::Error) -> Self {
        Self::Deserialize { target, source }
    }
}
