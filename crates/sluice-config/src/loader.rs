//! Layered configuration loading.

use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::schema::LogFormat;
use crate::{ConfigError, SluiceConfig};

/// Default prefix for environment overrides.
pub const DEFAULT_ENV_PREFIX: &str = "SLUICE";

/// Builds a [`SluiceConfig`] from layers, later layers winning:
///
/// 1. defaults (or a preset)
/// 2. files and strings, merged key by key in the order given
/// 3. variables from a `.env` file
/// 4. process environment variables `PREFIX__SECTION__KEY`
///
/// ```no_run
/// use sluice_config::ConfigLoader;
///
/// # fn main() -> Result<(), sluice_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("sluice.toml")?
///     .with_dotenv()?
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: SluiceConfig,
    env_prefix: String,
    process_env: bool,
    dotenv: BTreeMap<String, String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Starts from defaults with the `SLUICE` prefix.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: SluiceConfig::default(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            process_env: true,
            dotenv: BTreeMap::new(),
        }
    }

    /// Starts from the development preset.
    ///
    /// ```
    /// use sluice_config::{ConfigLoader, LogFormat};
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.format, LogFormat::Pretty);
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = SluiceConfig::development();
        self
    }

    /// Starts from the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = SluiceConfig::production();
        self
    }

    /// Merges a `.toml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Fails when the file is missing, unreadable, has another extension, or
    /// does not parse.
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::file_read(path, e))?;
        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        self.with_string(&content, &format)
    }

    /// Merges a file when it exists.
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

    /// Merges configuration text in `format` ("toml" or "json").
    ///
    /// ```
    /// use sluice_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string("[server]\nhttp_addr = \"127.0.0.1:3000\"", "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.server.http_addr, "127.0.0.1:3000");
    /// assert_eq!(config.server.shutdown_timeout_secs, 30);
    /// ```
    ///
    /// # Errors
    ///
    /// Fails for an unknown format, a parse error or an unknown key.
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let (format, layer): (&'static str, Value) = match format.to_lowercase().as_str() {
            "toml" => {
                let table: toml::Table = toml::from_str(content)?;
                ("toml", serde_json::to_value(table)?)
            }
            "json" => ("json", serde_json::from_str(content)?),
            other => {
                return Err(ConfigError::ParseError {
                    format: "unknown",
                    message: format!("unsupported configuration format: '{other}'"),
                })
            }
        };

        let mut merged = serde_json::to_value(&self.config)?;
        merge(&mut merged, layer);
        self.config = serde_json::from_value(merged).map_err(|e| ConfigError::ParseError {
            format,
            message: e.to_string(),
        })?;
        Ok(self)
    }

    /// Sets the environment prefix.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_uppercase();
        self
    }

    /// Ignores process environment variables; dotenv files still apply.
    #[must_use]
    pub fn without_env(mut self) -> Self {
        self.process_env = false;
        self
    }

    /// Reads `.env` from the working directory when present.
    ///
    /// # Errors
    ///
    /// Fails when the file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        let path = Path::new(".env");
        if path.exists() {
            self.with_dotenv_file(path)
        } else {
            Ok(self)
        }
    }

    /// Reads variables from a dotenv file.
    ///
    /// The variables feed the environment layer without touching the process
    /// environment; real environment variables still win.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or a line does not parse.
    pub fn with_dotenv_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let entries = dotenvy::from_path_iter(path).map_err(|e| dotenv_error(path, e))?;
        for entry in entries {
            let (key, value) = entry.map_err(|e| dotenv_error(path, e))?;
            self.dotenv.insert(key, value);
        }
        Ok(self)
    }

    /// Applies the environment layer and validates.
    ///
    /// # Errors
    ///
    /// Fails on an unusable environment value or an invalid configuration.
    pub fn load(mut self) -> Result<SluiceConfig, ConfigError> {
        let prefix = std::mem::take(&mut self.env_prefix);
        let mut vars = std::mem::take(&mut self.dotenv);
        if self.process_env {
            vars.extend(env::vars().filter(|(k, _)| k.starts_with(&prefix)));
        }
        for (key, value) in &vars {
            self.apply_env_var(key, value, &prefix)?;
        }

        self.config.validate()?;
        Ok(self.config)
    }

    /// Returns the configuration without the environment layer or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> SluiceConfig {
        self.config
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key.strip_prefix(prefix).and_then(|k| k.strip_prefix("__")) else {
            return Ok(());
        };
        let parts: Vec<&str> = rest.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["SERVICE", "NAME"] => config.service.name = value.to_string(),

            ["SERVER", "HTTP_ADDR"] => config.server.http_addr = value.to_string(),
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                config.server.shutdown_timeout_secs = parse_number(key, value)?;
            }
            ["SERVER", "MAX_BODY_BYTES"] => {
                config.server.max_body_bytes = parse_number(key, value)?;
            }

            ["NEGOTIATION", "DEFAULT_ACCEPT"] => {
                config.negotiation.default_accept = value.to_string();
            }

            ["SECURITY", "REALM"] => config.security.realm = value.to_string(),

            ["LOGGING", "ENABLED"] => config.logging.enabled = parse_flag(key, value)?,
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => return Err(ConfigError::env_var(key, "expected 'json' or 'pretty'")),
                };
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                config.logging.include_location = parse_flag(key, value)?;
            }
            ["LOGGING", "INCLUDE_TARGET"] => {
                config.logging.include_target = parse_flag(key, value)?;
            }
            ["LOGGING", "INCLUDE_SPAN_EVENTS"] => {
                config.logging.include_span_events = parse_flag(key, value)?;
            }

            _ => return Err(ConfigError::env_var(key, "unknown configuration key")),
        }

        Ok(())
    }
}

/// Deep-merges `layer` into `base`; objects merge, everything else replaces.
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

fn dotenv_error(path: &Path, e: dotenvy::Error) -> ConfigError {
    match e {
        dotenvy::Error::Io(source) => ConfigError::file_read(path, source),
        other => ConfigError::ParseError {
            format: "dotenv",
            message: other.to_string(),
        },
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::env_var(key, "expected a non-negative integer"))
}

/// Parse a boolean from a string.
fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::env_var(key, "expected boolean")),
    }
}
