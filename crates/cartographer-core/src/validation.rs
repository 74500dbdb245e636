//! Per-route validation metadata.
//!
//! A [`ValidationSpec`] declares the schemas a route expects for its query
//! string and body, and the schemas of the responses it produces. The
//! validator middleware enforces the request half at dispatch time; the
//! documentation compiler reads all of it to describe the route.
//!
//! Wherever a schema is accepted, a plain field map is accepted too and is
//! turned into an object schema when the spec is built:
//!
//! ```rust
//! use cartographer_core::{Schema, ValidationSpec};
//!
//! let spec = ValidationSpec::builder()
//!     .query([("q", Schema::string())])
//!     .body(Schema::object().field("name", Schema::string()))
//!     .status_code("404", [("message", Schema::string())])
//!     .build();
//!
//! assert!(spec.query.as_ref().unwrap().object_fields().is_some());
//! ```

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::handler::Next;
use crate::issue::SchemaError;
use crate::request::Request;
use crate::response::Response;
use crate::schema::Schema;

/// A schema, or a field map standing for an object schema over its fields.
#[derive(Debug, Clone)]
pub enum SchemaInput {
    /// A complete schema.
    Schema(Schema),
    /// Field name to schema, in declaration order.
    Fields(IndexMap<String, Schema>),
}

impl SchemaInput {
    /// Resolves the input into a single schema.
    #[must_use]
    pub fn into_schema(self) -> Schema {
        match self {
            Self::Schema(schema) => schema,
            Self::Fields(fields) => Schema::object_from(fields),
        }
    }
}

impl From<Schema> for SchemaInput {
    fn from(schema: Schema) -> Self {
        Self::Schema(schema)
    }
}

impl From<IndexMap<String, Schema>> for SchemaInput {
    fn from(fields: IndexMap<String, Schema>) -> Self {
        Self::Fields(fields)
    }
}

impl<K: Into<String>> From<Vec<(K, Schema)>> for SchemaInput {
    fn from(fields: Vec<(K, Schema)>) -> Self {
        Self::Fields(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

impl<K: Into<String>, const N: usize> From<[(K, Schema); N]> for SchemaInput {
    fn from(fields: [(K, Schema); N]) -> Self {
        Self::Fields(fields.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// The request part being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPhase {
    /// The query string.
    Query,
    /// The request body.
    Body,
}

impl ValidationPhase {
    /// Returns the lower-case phase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Query => "query",
            Self::Body => "body",
        }
    }
}

impl fmt::Display for ValidationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request data that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{phase} validation failed: {error}")]
pub struct ValidationFailure {
    /// Which part of the request failed.
    pub phase: ValidationPhase,
    /// The issues found.
    #[source]
    pub error: SchemaError,
}

/// Custom handling for a validation failure.
///
/// Receives the failure, the request, the response and the continuation.
/// Whatever it does is final: the validator takes no further action.
pub type ErrorHandler =
    Arc<dyn Fn(ValidationFailure, &mut Request, &mut Response, Next<'_>) + Send + Sync>;

/// Validation metadata for one route.
#[derive(Clone)]
pub struct ValidationSpec {
    /// Schema for the request body.
    pub body: Option<Schema>,
    /// Schema for the query object.
    pub query: Option<Schema>,
    /// Schema for the default (`200`) response. Documentation only.
    pub response: Option<Schema>,
    /// Status code to response schema, in declaration order. Documentation only.
    pub status_codes: IndexMap<String, Schema>,
    /// Whether a body failure stops the request (default `true`).
    pub body_throws_error: bool,
    /// Whether a query failure stops the request (default `true`).
    pub query_throws_error: bool,
    /// Replaces the default error response.
    pub error_handler: Option<ErrorHandler>,
}

impl Default for ValidationSpec {
    fn default() -> Self {
        Self {
            body: None,
            query: None,
            response: None,
            status_codes: IndexMap::new(),
            body_throws_error: true,
            query_throws_error: true,
            error_handler: None,
        }
    }
}

impl ValidationSpec {
    /// Starts building a spec.
    #[must_use]
    pub fn builder() -> ValidationSpecBuilder {
        ValidationSpecBuilder::default()
    }

    /// Returns true if neither the query nor the body is checked.
    #[must_use]
    pub fn is_passive(&self) -> bool {
        self.query.is_none() && self.body.is_none()
    }
}

impl fmt::Debug for ValidationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationSpec")
            .field("body", &self.body.is_some())
            .field("query", &self.query.is_some())
            .field("response", &self.response.is_some())
            .field("status_codes", &self.status_codes.keys().collect::<Vec<_>>())
            .field("body_throws_error", &self.body_throws_error)
            .field("query_throws_error", &self.query_throws_error)
            .field("error_handler", &self.error_handler.is_some())
            .finish()
    }
}

/// Builder for [`ValidationSpec`].
#[derive(Debug, Default)]
#[must_use]
pub struct ValidationSpecBuilder {
    spec: ValidationSpec,
}

impl ValidationSpecBuilder {
    /// Sets the body schema.
    pub fn body(mut self, schema: impl Into<SchemaInput>) -> Self {
        self.spec.body = Some(schema.into().into_schema());
        self
    }

    /// Sets the query schema.
    pub fn query(mut self, schema: impl Into<SchemaInput>) -> Self {
        self.spec.query = Some(schema.into().into_schema());
        self
    }

    /// Sets the `200` response schema.
    pub fn response(mut self, schema: impl Into<SchemaInput>) -> Self {
        self.spec.response = Some(schema.into().into_schema());
        self
    }

    /// Declares the response schema for a status code.
    ///
    /// Codes keep the order they are declared in; declaring a code twice
    /// replaces the schema in place.
    pub fn status_code(mut self, code: impl Into<String>, schema: impl Into<SchemaInput>) -> Self {
        self.spec
            .status_codes
            .insert(code.into(), schema.into().into_schema());
        self
    }

    /// Sets whether a body failure stops the request.
    pub fn body_throws_error(mut self, throws: bool) -> Self {
        self.spec.body_throws_error = throws;
        self
    }

    /// Sets whether a query failure stops the request.
    pub fn query_throws_error(mut self, throws: bool) -> Self {
        self.spec.query_throws_error = throws;
        self
    }

    /// Installs a custom error handler.
    pub fn error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(ValidationFailure, &mut Request, &mut Response, Next<'_>) + Send + Sync + 'static,
    {
        self.spec.error_handler = Some(Arc::new(handler));
        self
    }

    /// Finishes the spec.
    #[must_use]
    pub fn build(self) -> ValidationSpec {
        self.spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_throw() {
        let spec = ValidationSpec::default();
        assert!(spec.body_throws_error);
        assert!(spec.query_throws_error);
        assert!(spec.is_passive());
    }

    #[test]
    fn test_field_map_becomes_object_schema() {
        let spec = ValidationSpec::builder()
            .body([("name", Schema::string()), ("age", Schema::integer())])
            .build();

        let body = spec.body.unwrap();
        let names: Vec<_> = body.object_fields().unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["name", "age"]);
        assert!(body.validate(&json!({"name": "a", "age": 1})).is_ok());
        assert!(body.validate(&json!({"name": "a"})).is_err());
    }

    #[test]
    fn test_status_codes_keep_order() {
        let spec = ValidationSpec::builder()
            .status_code("401", Schema::object())
            .status_code("404", vec![("message", Schema::string())])
            .build();
        let codes: Vec<_> = spec.status_codes.keys().cloned().collect();
        assert_eq!(codes, vec!["401", "404"]);
    }

    #[test]
    fn test_throw_flags() {
        let spec = ValidationSpec::builder()
            .body_throws_error(false)
            .query_throws_error(false)
            .build();
        assert!(!spec.body_throws_error);
        assert!(!spec.query_throws_error);
    }

    #[test]
    fn test_failure_display() {
        let failure = ValidationFailure {
            phase: ValidationPhase::Body,
            error: Schema::string().validate(&json!(1)).unwrap_err(),
        };
        assert_eq!(
            failure.to_string(),
            "body validation failed: Expected string, received number"
        );
    }
}
