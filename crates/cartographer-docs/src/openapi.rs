//! OpenAPI document types.
//!
//! The subset of the OpenAPI 3.0 object model that Cartographer emits:
//! <https://spec.openapis.org/oas/v3.0.0>. Schema objects are carried as
//! plain JSON values produced by a [`SchemaConverter`](crate::SchemaConverter).

use cartographer_core::HttpMethod;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The OpenAPI version written into every generated document.
pub const OPENAPI_VERSION: &str = "3.0.0";

/// Content type used for request and response bodies.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// OpenAPI document root object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApi {
    /// OpenAPI version, always [`OPENAPI_VERSION`] for generated documents.
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// Documented paths in route order. Serialized even when empty.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
}

impl OpenApi {
    /// Creates a document with no paths.
    #[must_use]
    pub fn new(info: Info) -> Self {
        Self {
            openapi: OPENAPI_VERSION.to_string(),
            info,
            paths: IndexMap::new(),
        }
    }

    /// Looks up the operation documented for `method` at `path`.
    #[must_use]
    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(path).and_then(|item| item.operation(method))
    }
}

/// API metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
}

impl Info {
    /// Creates metadata from a title and version.
    #[must_use]
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            version: version.into(),
        }
    }
}

/// The operations documented for a single path.
///
/// Methods serialize in the order they were first documented, so a path
/// registered with `post` before `get` lists `post` first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathItem {
    /// Operations keyed by method.
    pub operations: IndexMap<HttpMethod, Operation>,
}

impl PathItem {
    /// Stores `operation` under `method`, returning the one it replaced.
    ///
    /// A replaced operation keeps its original position.
    pub fn set_operation(&mut self, method: HttpMethod, operation: Operation) -> Option<Operation> {
        self.operations.insert(method, operation)
    }

    /// Returns the operation stored under `method`.
    #[must_use]
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations.get(&method)
    }

    /// Lists the documented methods in serialization order.
    #[must_use]
    pub fn methods(&self) -> Vec<HttpMethod> {
        self.operations.keys().copied().collect()
    }
}

/// A documented endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Path parameters followed by query parameters.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Request body, present when the body is validated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code string.
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// URL path parameter.
    Path,
    /// Query string parameter.
    Query,
}

/// An operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Where the parameter is read from.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Whether the parameter must be supplied.
    pub required: bool,
    /// Schema of the parameter value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

/// A JSON request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Whether the body must be supplied.
    pub required: bool,
    /// Media types keyed by content type.
    pub content: IndexMap<String, MediaType>,
}

impl RequestBody {
    /// A required JSON body described by `schema`.
    #[must_use]
    pub fn json(schema: Value) -> Self {
        Self {
            required: true,
            content: json_content(schema),
        }
    }
}

/// A documented response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Human-readable description, empty for generated responses.
    pub description: String,
    /// Media types keyed by content type.
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

impl Response {
    /// A JSON response described by `schema`, with an empty description.
    #[must_use]
    pub fn json(schema: Value) -> Self {
        Self {
            description: String::new(),
            content: json_content(schema),
        }
    }
}

/// Media type object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Body schema.
    pub schema: Value,
}

fn json_content(schema: Value) -> IndexMap<String, MediaType> {
    let mut content = IndexMap::new();
    content.insert(JSON_CONTENT_TYPE.to_string(), MediaType { schema });
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_document_serializes_paths() {
        let doc = OpenApi::new(Info::new("my title", "1.0.0"));
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            value,
            json!({
                "openapi": "3.0.0",
                "info": {"title": "my title", "version": "1.0.0"},
                "paths": {}
            })
        );
    }

    #[test]
    fn test_set_operation_replaces() {
        let mut item = PathItem::default();
        assert!(item.set_operation(HttpMethod::Put, Operation::default()).is_none());
        assert!(item.set_operation(HttpMethod::Put, Operation::default()).is_some());
        assert_eq!(item.methods(), vec![HttpMethod::Put]);
    }

    #[test]
    fn test_path_item_only_serializes_set_methods() {
        let mut item = PathItem::default();
        item.set_operation(HttpMethod::Patch, Operation::default());
        let value = serde_json::to_value(&item).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["patch"]);
    }

    #[test]
    fn test_path_item_keeps_documentation_order() {
        let mut item = PathItem::default();
        item.set_operation(HttpMethod::Post, Operation::default());
        item.set_operation(HttpMethod::Get, Operation::default());
        item.set_operation(HttpMethod::Post, Operation::default());

        assert_eq!(item.methods(), vec![HttpMethod::Post, HttpMethod::Get]);
        let value = serde_json::to_value(&item).unwrap();
        let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["post", "get"]);
    }

    #[test]
    fn test_parameter_serialization() {
        let param = Parameter {
            name: "id".to_string(),
            location: ParameterIn::Path,
            required: true,
            schema: None,
        };
        assert_eq!(
            serde_json::to_value(&param).unwrap(),
            json!({"name": "id", "in": "path", "required": true})
        );
    }

    #[test]
    fn test_operation_omits_missing_body() {
        let value = serde_json::to_value(Operation::default()).unwrap();
        assert_eq!(value, json!({"parameters": [], "responses": {}}));
    }

    #[test]
    fn test_response_json_shape() {
        let value = serde_json::to_value(Response::json(json!({"type": "string"}))).unwrap();
        assert_eq!(
            value,
            json!({
                "description": "",
                "content": {"application/json": {"schema": {"type": "string"}}}
            })
        );
    }

    #[test]
    fn test_document_round_trips() {
        let mut doc = OpenApi::new(Info::new("api", "2.0.0"));
        let mut item = PathItem::default();
        item.set_operation(
            HttpMethod::Post,
            Operation {
                request_body: Some(RequestBody::json(json!({"type": "object"}))),
                ..Operation::default()
            },
        );
        doc.paths.insert("/items".to_string(), item);

        let json = serde_json::to_string(&doc).unwrap();
        let parsed: OpenApi = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, doc);
        assert!(parsed.operation("/items", HttpMethod::Post).is_some());
        assert!(parsed.operation("/items", HttpMethod::Get).is_none());
    }
}
