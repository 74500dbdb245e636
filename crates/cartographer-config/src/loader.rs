//! Layered configuration loading.

use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::{CartographerConfig, ConfigError};

/// Configuration loader.
///
/// Layers are applied in call order, each overriding only the fields it
/// sets:
/// 1. A preset (defaults unless [`with_development`](Self::with_development)
///    or [`with_production`](Self::with_production) is used)
/// 2. Configuration files or strings (TOML or JSON)
/// 3. Environment variables named `PREFIX__SECTION__KEY`, applied by
///    [`load`](Self::load)
///
/// # Example
///
/// ```no_run
/// use cartographer_config::ConfigLoader;
///
/// # fn main() -> Result<(), cartographer_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("cartographer.toml")?
///     .with_dotenv()?
///     .with_env_prefix("CARTOGRAPHER")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: CartographerConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader starting from the defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CartographerConfig::default(),
            env_prefix: None,
        }
    }

    /// Resets to the default configuration.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = CartographerConfig::default();
        self
    }

    /// Resets to the development preset.
    ///
    /// ```
    /// use cartographer_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = CartographerConfig::development();
        self
    }

    /// Resets to the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = CartographerConfig::production();
        self
    }

    /// Applies a configuration file.
    ///
    /// The format follows the extension, `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file is missing or unreadable, has an
    /// unsupported extension, does not parse, or contains unknown fields.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.display().to_string()))?;

        tracing::debug!(path = %path.display(), "loading configuration file");
        self.with_string(&content, &format)
    }

    /// Applies a configuration file if it exists.
    ///
    /// # Errors
    ///
    /// Same as [`with_file`](Self::with_file) for an existing file.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Applies configuration from a string in `format` (`"toml"` or `"json"`).
    ///
    /// ```
    /// use cartographer_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[docs]\ntitle = \"Users\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.docs.title, "Users");
    /// assert_eq!(config.docs.path, "/docs");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or a field is unknown.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let layer: Value = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        let mut merged = serde_json::to_value(&self.config)?;
        merge(&mut merged, layer);
        self.config = serde_json::from_value(merged)?;
        Ok(self)
    }

    /// Loads `.env` from the current directory or its parents, if present.
    ///
    /// Variables already set in the environment are not overwritten.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a `.env` file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!(path = %path.display(), "loaded .env file"),
            Err(e) if e.not_found() => {}
            Err(e) => return Err(e.into()),
        }
        Ok(self)
    }

    /// Sets the environment variable prefix used by [`load`](Self::load).
    ///
    /// With prefix `CARTOGRAPHER`:
    /// - `CARTOGRAPHER__DOCS__TITLE=Users`
    /// - `CARTOGRAPHER__VALIDATION__ERROR_STATUS=422`
    /// - `CARTOGRAPHER__LOGGING__LEVEL=debug`
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Applies environment overrides and validates.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an override does not parse or validation fails.
    pub fn load(mut self) -> Result<CartographerConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> CartographerConfig {
        self.config
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let mut vars: Vec<(String, String)> =
            env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["DOCS", "ENABLED"] => config.docs.enabled = bool_var(key, value)?,
            ["DOCS", "PATH"] => config.docs.path = value.to_string(),
            ["DOCS", "TITLE"] => config.docs.title = value.to_string(),
            ["DOCS", "VERSION"] => config.docs.version = value.to_string(),

            ["VALIDATION", "ERROR_STATUS"] => {
                config.validation.error_status = value
                    .parse()
                    .map_err(|_| ConfigError::env_parse_error(key, "expected integer"))?;
            }
            ["VALIDATION", "EXPOSE_ISSUES"] => {
                config.validation.expose_issues = bool_var(key, value)?;
            }

            ["LOGGING", "ENABLED"] => config.logging.enabled = bool_var(key, value)?,
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                config.logging.json_format = match value.to_lowercase().as_str() {
                    "json" => true,
                    "pretty" => false,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "SPAN_EVENTS"] => config.logging.span_events = bool_var(key, value)?,
            ["LOGGING", "FILE_LINE_INFO"] => {
                config.logging.file_line_info = bool_var(key, value)?;
            }
            ["LOGGING", "THREAD_IDS"] => config.logging.thread_ids = bool_var(key, value)?,
            ["LOGGING", "INCLUDE_TARGET"] => {
                config.logging.include_target = bool_var(key, value)?;
            }

            _ => tracing::debug!(var = key, "ignoring unknown configuration variable"),
        }

        Ok(())
    }
}

/// Overlays `layer` onto `base`, recursing into tables.
fn merge(base: &mut Value, layer: Value) {
    match (base, layer) {
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

fn bool_var(key: &str, value: &str) -> Result<bool, ConfigError> {
    parse_bool(value).ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
