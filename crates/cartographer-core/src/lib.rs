//! # Cartographer Core
//!
//! Core types shared by every Cartographer crate.
//!
//! - [`Request`] / [`Response`] - the mutable request/response pair handlers work on
//! - [`Handler`] / [`Next`] - handler records and the single-use continuation
//! - [`Schema`] - the schema engine (validation, coercion, JSON-schema derivation)
//! - [`ValidationSpec`] - per-route validation metadata attached to handlers
//! - [`CoreError`] - shared error type

#![doc(html_root_url = "https://docs.rs/cartographer-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod handler;
mod issue;
pub mod json_schema;
mod method;
mod params;
mod request;
mod response;
pub mod schema;
pub mod validation;

pub use error::{CoreError, CoreResult};
pub use handler::{Handler, HandlerFn, Next};
pub use issue::{Issue, IssueCode, PathSegment, SchemaError};
pub use json_schema::Dialect;
pub use method::{HttpMethod, UnknownMethod};
pub use params::Params;
pub use request::{decode_query, Request, RequestBuilder};
pub use response::Response;
pub use schema::Schema;
pub use validation::{
    ErrorHandler, SchemaInput, ValidationFailure, ValidationPhase, ValidationSpec,
    ValidationSpecBuilder,
};
