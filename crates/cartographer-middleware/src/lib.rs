//! # Cartographer Middleware
//!
//! Request validation for Cartographer routes.
//!
//! [`validate`] builds a handler from a [`ValidationSpec`](cartographer_core::ValidationSpec).
//! Placed in front of a route handler, it checks the query string and then the
//! body, replaces both with their validated form and continues the chain. On
//! failure it either hands the failure to the spec's custom error handler or
//! writes a JSON error response, and the chain stops.
//!
//! ## Example
//!
//! ```rust
//! use cartographer_core::{Handler, Schema, ValidationSpec};
//! use cartographer_middleware::validate;
//! use cartographer_router::Router;
//!
//! let create_user = Handler::named("createUser", |req, res, _| {
//!     let name = req.body["name"].as_str().unwrap_or_default().to_string();
//!     res.json(&serde_json::json!({ "name": name }));
//! });
//!
//! let mut router = Router::new();
//! router.post(
//!     "/users",
//!     [
//!         validate(
//!             ValidationSpec::builder()
//!                 .body([("name", Schema::string().min_length(1))])
//!                 .response([("name", Schema::string())])
//!                 .build(),
//!         ),
//!         create_user,
//!     ],
//! );
//! ```
//!
//! ## Observability
//!
//! Every failed phase emits a `tracing` debug event and increments the
//! `cartographer_validation_failures_total` counter, labelled with the phase
//! and whether the failure was rejected or suppressed.

#![doc(html_root_url = "https://docs.rs/cartographer-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error_response;
mod validator;

pub use error_response::{write_error_response, ErrorResponsePolicy, VALIDATION_ERROR_CODE};
pub use validator::{
    describe_metrics, validate, ValidatorFactory, VALIDATION_FAILURES_METRIC, VALIDATOR_NAME,
};
