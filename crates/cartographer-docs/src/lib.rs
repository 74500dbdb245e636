//! # Cartographer Docs
//!
//! OpenAPI 3.0 documents compiled from the validation metadata attached to
//! router handlers.
//!
//! ## Quick Start
//!
//! ```rust
//! use cartographer_core::{Handler, Schema, ValidationSpec};
//! use cartographer_docs::{compile, DocsRoutes, OpenApiConfig};
//! use cartographer_router::Router;
//!
//! let mut router = Router::new();
//! router.post(
//!     "/users",
//!     Handler::new(|_, _, _| {}).with_validation(
//!         ValidationSpec::builder()
//!             .body([("name", Schema::string())])
//!             .build(),
//!     ),
//! );
//!
//! let doc = compile(&OpenApiConfig::new("Users", "1.0.0"), &router);
//! assert!(doc.paths.contains_key("/users"));
//!
//! // Serve the document and a Swagger UI page next to the API
//! DocsRoutes::new("/docs", &doc).unwrap().mount(&mut router);
//! ```
//!
//! Routes without validation metadata are left out of the document.

#![doc(html_root_url = "https://docs.rs/cartographer-docs/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod generator;
mod openapi;
mod routes;
mod swagger;

pub use error::{DocsError, DocsResult};
pub use generator::{
    compile, compile_routes, JsonSchemaConverter, OpenApiConfig, OpenApiGenerator,
    SchemaConverter,
};
pub use openapi::{
    Info, MediaType, OpenApi, Operation, Parameter, ParameterIn, PathItem, RequestBody, Response,
    JSON_CONTENT_TYPE, OPENAPI_VERSION,
};
pub use routes::DocsRoutes;
pub use swagger::{DocExpansion, SwaggerUi};
