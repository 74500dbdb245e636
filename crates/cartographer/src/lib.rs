//! # Cartographer
//!
//! Schema validation for router handlers, and OpenAPI documents recovered
//! from the same router tree.
//!
//! - [`validate`] builds a handler that checks the query string and body of a
//!   request against a [`ValidationSpec`](prelude::ValidationSpec) and carries
//!   that spec with it
//! - [`retrospect`] lists every route reachable from a router, nested routers
//!   included
//! - [`compile`] turns those routes into an OpenAPI 3.0 document, documenting
//!   only routes with a validator in their chain
//!
//! ## Quick Start
//!
//! ```rust
//! use cartographer::prelude::*;
//! use serde_json::json;
//!
//! let create = validate(
//!     ValidationSpec::builder()
//!         .body([("name", Schema::string().min_length(1))])
//!         .response([("id", Schema::integer())])
//!         .build(),
//! );
//! let store = Handler::named("store", |_, res, _| {
//!     res.json(&json!({"id": 1}));
//! });
//!
//! let mut users = Router::new();
//! users.post("/", [create, store]);
//! let mut app = Router::new();
//! app.mount("/users", users);
//!
//! let doc = compile(&OpenApiConfig::new("Users", "1.0.0"), &app);
//! assert!(doc.operation("/users", HttpMethod::Post).is_some());
//! ```

#![doc(html_root_url = "https://docs.rs/cartographer/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use cartographer_core as core;

// Re-export router types
pub use cartographer_router as router;

// Re-export validator middleware
pub use cartographer_middleware as middleware;

// Re-export document generation
pub use cartographer_docs as docs;

// Re-export logging setup
pub use cartographer_telemetry as telemetry;

// Re-export configuration
pub use cartographer_config as config;

pub use cartographer_docs::compile;
pub use cartographer_middleware::validate;
pub use cartographer_router::retrospect;

use cartographer_config::CartographerConfig;
use cartographer_docs::{DocsResult, DocsRoutes, OpenApi};
use cartographer_router::Router;

/// Compiles the document for `router` and, when `config.docs.enabled`,
/// mounts the documentation endpoints on it.
///
/// The document is compiled before the endpoints are added, so it only
/// describes the routes already registered.
///
/// # Errors
///
/// Returns a [`DocsError`](cartographer_docs::DocsError) if the document
/// cannot be serialized or the docs path is invalid.
pub fn mount_docs(config: &CartographerConfig, router: &mut Router) -> DocsResult<OpenApi> {
    let doc = compile(&config.openapi_config(), router);
    if config.docs.enabled {
        DocsRoutes::new(&config.docs.path, &doc)?.mount(router);
    } else {
        tracing::debug!("documentation endpoints disabled");
    }
    Ok(doc)
}

/// Prelude module for convenient imports.
///
/// ```rust
/// use cartographer::prelude::*;
/// ```
pub mod prelude {
    pub use cartographer_core::{
        Handler, HttpMethod, Next, Request, Response, Schema, SchemaError, ValidationFailure,
        ValidationPhase, ValidationSpec,
    };

    pub use cartographer_router::{Dispatch, Route, RouteRecord, Router};

    pub use cartographer_middleware::{validate, ErrorResponsePolicy, ValidatorFactory};

    pub use cartographer_docs::{compile, DocsRoutes, OpenApi, OpenApiConfig, SwaggerUi};

    pub use cartographer_config::{CartographerConfig, ConfigLoader};

    pub use cartographer_telemetry::{init_logging, LogConfig};

    pub use cartographer_router::retrospect;
}
