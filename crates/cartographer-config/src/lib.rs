//! Typed configuration for Cartographer.
//!
//! [`CartographerConfig`] gathers the settings an application usually wants
//! to change without recompiling:
//!
//! - [`DocsConfig`] - document title and version, documentation mount path
//! - [`ValidationConfig`] - status and verbosity of default validation errors
//! - [`LogConfig`] - logging, as understood by `cartographer-telemetry`
//!
//! Configuration is layered by [`ConfigLoader`]: preset, then TOML or JSON
//! files, then `PREFIX__SECTION__KEY` environment variables. Unknown fields
//! are rejected.
//!
//! # Configuration File Format
//!
//! ```toml
//! [docs]
//! enabled = true
//! path = "/docs"
//! title = "Users API"
//! version = "1.2.0"
//!
//! [validation]
//! error_status = 422
//! expose_issues = false
//!
//! [logging]
//! level = "info,cartographer_middleware=debug"
//! json_format = true
//! ```

#![doc(html_root_url = "https://docs.rs/cartographer-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;

pub use cartographer_telemetry::LogConfig;
pub use config::{CartographerConfig, DocsConfig, ValidationConfig};
pub use error::ConfigError;
pub use loader::ConfigLoader;
