//! Logging setup for Cartographer.
//!
//! Every Cartographer crate reports through the `tracing` macros: validation
//! failures and skipped route layers at `debug`, generated documents at
//! `info`. This crate installs a `tracing-subscriber` pipeline that writes
//! those events as JSON lines or as human-readable output.
//!
//! # Example
//!
//! ```rust,no_run
//! use cartographer_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!("ready");
//! # Ok::<(), cartographer_telemetry::TelemetryError>(())
//! ```

#![doc(html_root_url = "https://docs.rs/cartographer-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{create_env_filter, init_logging, LogConfig};
