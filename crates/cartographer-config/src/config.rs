//! Configuration types.

use cartographer_docs::OpenApiConfig;
use cartographer_middleware::ErrorResponsePolicy;
use cartographer_telemetry::{create_env_filter, LogConfig};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Root configuration.
///
/// Every section is optional in files; missing sections and fields keep
/// their defaults. Unknown fields are rejected.
///
/// # Example
///
/// ```
/// use cartographer_config::CartographerConfig;
///
/// let config = CartographerConfig::default();
/// assert_eq!(config.docs.path, "/docs");
/// assert_eq!(config.validation.error_status, 400);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CartographerConfig {
    /// OpenAPI document and documentation endpoints.
    #[serde(default)]
    pub docs: DocsConfig,

    /// Default validation error responses.
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LogConfig,
}

impl CartographerConfig {
    /// Development preset: pretty debug logging.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LogConfig::development(),
            ..Self::default()
        }
    }

    /// Production preset: JSON logging, issue lists hidden from clients.
    #[must_use]
    pub fn production() -> Self {
        Self {
            validation: ValidationConfig {
                expose_issues: false,
                ..ValidationConfig::default()
            },
            logging: LogConfig::production(),
            ..Self::default()
        }
    }

    /// Checks values serde cannot check.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.docs.path.starts_with('/') {
            return Err(ConfigError::invalid_value(
                "docs.path",
                format!("must start with '/': {}", self.docs.path),
            ));
        }

        if self.docs.title.trim().is_empty() {
            return Err(ConfigError::invalid_value("docs.title", "must not be empty"));
        }

        if self.docs.version.trim().is_empty() {
            return Err(ConfigError::invalid_value("docs.version", "must not be empty"));
        }

        self.validation.status()?;

        if self.logging.enabled {
            create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Document compilation settings.
    #[must_use]
    pub fn openapi_config(&self) -> OpenApiConfig {
        OpenApiConfig::new(&self.docs.title, &self.docs.version)
    }

    /// Default validator error policy.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the status is not a client or
    /// server error code.
    pub fn error_policy(&self) -> Result<ErrorResponsePolicy, ConfigError> {
        Ok(ErrorResponsePolicy::default()
            .status(self.validation.status()?)
            .expose_issues(self.validation.expose_issues))
    }
}

/// Documentation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocsConfig {
    /// Whether the documentation endpoints are mounted.
    pub enabled: bool,

    /// Mount path of the Swagger UI page; the document is served below it.
    pub path: String,

    /// Document title.
    pub title: String,

    /// Document version.
    pub version: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/docs".to_string(),
            title: "API".to_string(),
            version: "0.1.0".to_string(),
        }
    }
}

/// Validation error response settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationConfig {
    /// Status code of the default error response.
    pub error_status: u16,

    /// Whether the default error response lists issues.
    pub expose_issues: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            error_status: 400,
            expose_issues: true,
        }
    }
}

impl ValidationConfig {
    fn status(&self) -> Result<StatusCode, ConfigError> {
        match StatusCode::from_u16(self.error_status) {
            Ok(status) if status.is_client_error() || status.is_server_error() => Ok(status),
            _ => Err(ConfigError::invalid_value(
                "validation.error_status",
                format!("expected a 4xx or 5xx status code, got {}", self.error_status),
            )),
        }
    }
}
