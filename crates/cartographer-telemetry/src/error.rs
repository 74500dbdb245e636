//! Telemetry error types.

use thiserror::Error;

/// Errors that can occur while setting up telemetry.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log level or filter directive could not be parsed.
    #[error("Invalid log filter '{filter}': {reason}")]
    InvalidFilter {
        /// The rejected filter string.
        filter: String,
        /// Parser message.
        reason: String,
    },

    /// Failed to install the global subscriber.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TelemetryError::LoggingInit("already set".to_string());
        assert_eq!(err.to_string(), "Failed to initialize logging: already set");

        let err = TelemetryError::InvalidFilter {
            filter: "x=loud".to_string(),
            reason: "bad level".to_string(),
        };
        assert!(err.to_string().contains("'x=loud'"));
    }
}
