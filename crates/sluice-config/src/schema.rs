//! Configuration section types.
//!
//! Every section fills missing keys from its `Default` and rejects unknown
//! ones.

use serde::{Deserialize, Serialize};
use sluice_telemetry::LogConfig;

/// Service identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// Name used in logs and documentation.
    pub name: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "sluice".to_string(),
        }
    }
}

/// HTTP hosting.
///
/// ```
/// use sluice_config::ServerConfig;
///
/// let config = ServerConfig::default();
/// assert_eq!(config.http_addr, "0.0.0.0:8080");
/// assert_eq!(config.max_body_bytes, 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address (e.g. "0.0.0.0:8080").
    pub http_addr: String,

    /// Graceful shutdown timeout in seconds.
    pub shutdown_timeout_secs: u64,

    /// Largest accepted request body; bigger bodies get 413.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:8080".to_string(),
            shutdown_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Content negotiation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct NegotiationConfig {
    /// Accept header assumed when a request sends none.
    pub default_accept: String,
}

impl Default for NegotiationConfig {
    fn default() -> Self {
        Self {
            default_accept: "*/*".to_string(),
        }
    }
}

/// Security scheme defaults.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SecurityConfig {
    /// Realm announced in `WWW-Authenticate` challenges.
    pub realm: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            realm: "sluice".to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines
    #[default]
    Json,
    /// Human-readable
    Pretty,
}

/// Logging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive.
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Include file and line.
    pub include_location: bool,

    /// Include the module path.
    pub include_target: bool,

    /// Log span open and close events.
    pub include_span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::from(&LogConfig::production())
    }
}

impl From<&LogConfig> for LoggingConfig {
    fn from(config: &LogConfig) -> Self {
        Self {
            enabled: config.enabled,
            level: config.level.clone(),
            format: if config.json_format {
                LogFormat::Json
            } else {
                LogFormat::Pretty
            },
            include_location: config.include_location,
            include_target: config.include_target,
            include_span_events: config.include_span_events,
        }
    }
}

impl From<&LoggingConfig> for LogConfig {
    fn from(config: &LoggingConfig) -> Self {
        Self {
            enabled: config.enabled,
            level: config.level.clone(),
            json_format: config.format == LogFormat::Json,
            include_location: config.include_location,
            include_target: config.include_target,
            include_span_events: config.include_span_events,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.shutdown_timeout_secs, 30);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: ServerConfig = toml::from_str("max_body_bytes = 10").unwrap();
        assert_eq!(config.max_body_bytes, 10);
        assert_eq!(config.http_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_unknown_field_rejected() {
        let result: Result<ServerConfig, _> = toml::from_str("port = 80");
        assert!(result.is_err());
    }

    #[test]
    fn test_log_format_lowercase() {
        let config: LoggingConfig = toml::from_str(r#"format = "pretty""#).unwrap();
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn test_logging_round_trips_through_log_config() {
        let development = LogConfig::development();
        let section = LoggingConfig::from(&development);
        assert_eq!(section.format, LogFormat::Pretty);
        assert_eq!(LogConfig::from(&section), development);
    }
}
