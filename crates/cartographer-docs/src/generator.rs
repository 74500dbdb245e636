//! Compiling routes into an OpenAPI document.
//!
//! Only routes whose handler chain carries a [`ValidationSpec`] are
//! documented; every other route is skipped. For a documented route the
//! operation is built entirely from the spec:
//!
//! - path parameters (in pattern order), then query parameters (in field order)
//! - a required JSON request body when the body is validated
//! - a `"200"` response for the response schema, then one response per status code
//!
//! Every schema is converted through a [`SchemaConverter`], always in the
//! [`Dialect::OpenApi3`] dialect.

use std::fmt;
use std::sync::Arc;

use cartographer_core::{Dialect, Schema, ValidationSpec};
use cartographer_router::{RouteRecord, Router};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::DocsResult;
use crate::openapi::{Info, OpenApi, Operation, Parameter, ParameterIn, RequestBody, Response};

/// Configuration of document compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenApiConfig {
    /// Metadata copied into the document.
    pub info: Info,
}

impl OpenApiConfig {
    /// Creates a configuration from a title and version.
    #[must_use]
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: Info::new(title, version),
        }
    }
}

/// Derives JSON-schema objects from [`Schema`]s.
pub trait SchemaConverter: Send + Sync {
    /// Converts `schema` into the requested dialect.
    fn convert(&self, schema: &Schema, dialect: Dialect) -> Value;
}

/// The default converter, backed by [`Schema::to_json_schema`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaConverter;

impl SchemaConverter for JsonSchemaConverter {
    fn convert(&self, schema: &Schema, dialect: Dialect) -> Value {
        schema.to_json_schema(dialect)
    }
}

/// OpenAPI document generator.
///
/// # Example
///
/// ```rust
/// use cartographer_core::{Handler, Schema, ValidationSpec};
/// use cartographer_docs::{OpenApiConfig, OpenApiGenerator};
/// use cartographer_router::Router;
///
/// let spec = ValidationSpec::builder().query([("q", Schema::string())]).build();
/// let mut router = Router::new();
/// router.get("/search", Handler::new(|_, _, _| {}).with_validation(spec));
///
/// let doc = OpenApiGenerator::new(OpenApiConfig::new("Search", "1.0.0"))
///     .generate(&router.routes());
/// assert_eq!(doc.paths.len(), 1);
/// ```
#[derive(Clone)]
pub struct OpenApiGenerator {
    config: OpenApiConfig,
    converter: Arc<dyn SchemaConverter>,
}

impl fmt::Debug for OpenApiGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenApiGenerator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OpenApiGenerator {
    /// Creates a generator using [`JsonSchemaConverter`].
    #[must_use]
    pub fn new(config: OpenApiConfig) -> Self {
        Self {
            config,
            converter: Arc::new(JsonSchemaConverter),
        }
    }

    /// Replaces the schema converter.
    #[must_use]
    pub fn converter(mut self, converter: impl SchemaConverter + 'static) -> Self {
        self.converter = Arc::new(converter);
        self
    }

    /// Builds the document for `routes`.
    #[must_use]
    pub fn generate(&self, routes: &[RouteRecord]) -> OpenApi {
        let mut doc = OpenApi::new(self.config.info.clone());
        let mut skipped = 0usize;

        for route in routes {
            let Some(spec) = route.validation_spec() else {
                skipped += 1;
                continue;
            };

            let operation = self.operation(route, spec);
            let replaced = doc
                .paths
                .entry(route.path.clone())
                .or_default()
                .set_operation(route.method, operation);
            if replaced.is_some() {
                tracing::debug!(
                    method = %route.method,
                    path = %route.path,
                    "later route replaced documented operation"
                );
            }
        }

        tracing::info!(
            title = %doc.info.title,
            paths = doc.paths.len(),
            skipped,
            "generated OpenAPI document"
        );
        doc
    }

    /// Builds the document for `routes` and serializes it as pretty JSON.
    pub fn generate_json(&self, routes: &[RouteRecord]) -> DocsResult<String> {
        Ok(serde_json::to_string_pretty(&self.generate(routes))?)
    }

    fn operation(&self, route: &RouteRecord, spec: &ValidationSpec) -> Operation {
        let mut parameters: Vec<Parameter> = route
            .params
            .iter()
            .map(|param| Parameter {
                name: param.name.clone(),
                location: ParameterIn::Path,
                required: !param.optional,
                schema: Some(json!({"type": "string"})),
            })
            .collect();

        if let Some(fields) = spec.query.as_ref().and_then(Schema::object_fields) {
            parameters.extend(fields.iter().map(|(name, field)| Parameter {
                name: name.clone(),
                location: ParameterIn::Query,
                required: !field.is_optional(),
                schema: Some(self.convert(field)),
            }));
        }

        let request_body = spec
            .body
            .as_ref()
            .map(|body| RequestBody::json(self.convert(body)));

        let mut responses = IndexMap::new();
        if let Some(response) = &spec.response {
            responses.insert("200".to_string(), Response::json(self.convert(response)));
        }
        for (code, schema) in &spec.status_codes {
            responses.insert(code.clone(), Response::json(self.convert(schema)));
        }

        Operation {
            parameters,
            request_body,
            responses,
        }
    }

    fn convert(&self, schema: &Schema) -> Value {
        self.converter.convert(schema, Dialect::OpenApi3)
    }
}

/// Compiles the document for every route reachable from `router`.
#[must_use]
pub fn compile(config: &OpenApiConfig, router: &Router) -> OpenApi {
    compile_routes(config, &router.routes())
}

/// Compiles the document for an already retrospected route list.
#[must_use]
pub fn compile_routes(config: &OpenApiConfig, routes: &[RouteRecord]) -> OpenApi {
    OpenApiGenerator::new(config.clone()).generate(routes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartographer_core::{Handler, HttpMethod};

    fn config() -> OpenApiConfig {
        OpenApiConfig::new("my title", "1.0.0")
    }

    fn validated(spec: ValidationSpec) -> Handler {
        Handler::new(|_, _, _| {}).with_validation(spec)
    }

    #[test]
    fn test_config_deserializes() {
        let parsed: OpenApiConfig =
            serde_json::from_value(json!({"info": {"title": "t", "version": "v"}})).unwrap();
        assert_eq!(parsed, OpenApiConfig::new("t", "v"));
    }

    #[test]
    fn test_config_rejects_unknown_options() {
        let parsed = serde_json::from_value::<OpenApiConfig>(
            json!({"info": {"title": "t", "version": "v"}, "servers": []}),
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_path_params_carry_string_schema() {
        let mut router = Router::new();
        router.get("/users/:id", validated(ValidationSpec::default()));

        let doc = compile(&config(), &router);
        let op = doc.operation("/users/:id", HttpMethod::Get).unwrap();
        assert_eq!(op.parameters[0].schema, Some(json!({"type": "string"})));
    }

    #[test]
    fn test_query_params_use_field_schema() {
        let spec = ValidationSpec::builder()
            .query([("page", Schema::integer().optional())])
            .build();
        let mut router = Router::new();
        router.get("/items", validated(spec));

        let doc = compile(&config(), &router);
        let param = &doc.operation("/items", HttpMethod::Get).unwrap().parameters[0];
        assert_eq!(param.location, ParameterIn::Query);
        assert!(!param.required);
        assert_eq!(param.schema, Some(json!({"type": "integer"})));
    }

    #[test]
    fn test_non_object_query_yields_no_params() {
        let spec = ValidationSpec::builder().query(Schema::any()).build();
        let mut router = Router::new();
        router.get("/raw", validated(spec));

        let doc = compile(&config(), &router);
        assert!(doc.operation("/raw", HttpMethod::Get).unwrap().parameters.is_empty());
    }

    #[test]
    fn test_query_field_with_default_is_not_required() {
        let spec = ValidationSpec::builder()
            .query([("limit", Schema::integer().default_value(20))])
            .build();
        let mut router = Router::new();
        router.get("/items", validated(spec));

        let doc = compile(&config(), &router);
        assert!(!doc.operation("/items", HttpMethod::Get).unwrap().parameters[0].required);
    }

    #[test]
    fn test_one_path_collects_several_methods() {
        let mut router = Router::new();
        router
            .get("/items", validated(ValidationSpec::default()))
            .post("/items", validated(ValidationSpec::default()));

        let doc = compile(&config(), &router);
        assert_eq!(doc.paths.len(), 1);
        assert_eq!(
            doc.paths["/items"].methods(),
            vec![HttpMethod::Get, HttpMethod::Post]
        );
    }

    #[test]
    fn test_methods_follow_registration_order() {
        let mut router = Router::new();
        router
            .post("/items", validated(ValidationSpec::default()))
            .get("/items", validated(ValidationSpec::default()));

        let value = serde_json::to_value(compile(&config(), &router)).unwrap();
        let keys: Vec<_> = value["paths"]["/items"]
            .as_object()
            .unwrap()
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, vec!["post", "get"]);
    }

    #[test]
    fn test_generate_json() {
        let json = OpenApiGenerator::new(config()).generate_json(&[]).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["paths"], json!({}));
        assert_eq!(value["openapi"], "3.0.0");
    }
}
