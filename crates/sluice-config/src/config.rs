//! The root configuration type.

use std::net::SocketAddr;

use serde::{Deserialize, Serialize};
use sluice_core::ContentType;
use sluice_telemetry::LogConfig;

use crate::schema::{
    LoggingConfig, NegotiationConfig, SecurityConfig, ServerConfig, ServiceConfig,
};
use crate::ConfigError;

/// Complete configuration for a Sluice service.
///
/// ```toml
/// [service]
/// name = "blog"
///
/// [server]
/// http_addr = "127.0.0.1:3000"
/// max_body_bytes = 2097152
///
/// [negotiation]
/// default_accept = "application/json"
///
/// [security]
/// realm = "blog"
///
/// [logging]
/// level = "debug"
/// format = "pretty"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct SluiceConfig {
    /// Service identity.
    pub service: ServiceConfig,
    /// HTTP hosting.
    pub server: ServerConfig,
    /// Content negotiation.
    pub negotiation: NegotiationConfig,
    /// Security defaults.
    pub security: SecurityConfig,
    /// Logging.
    pub logging: LoggingConfig,
}

impl SluiceConfig {
    /// Pretty debug logging.
    #[must_use]
    pub fn development() -> Self {
        Self {
            logging: LoggingConfig::from(&LogConfig::development()),
            ..Self::default()
        }
    }

    /// JSON info logging.
    #[must_use]
    pub fn production() -> Self {
        Self {
            logging: LoggingConfig::from(&LogConfig::production()),
            ..Self::default()
        }
    }

    /// The logging section as a telemetry config.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        LogConfig::from(&self.logging)
    }

    /// The bind address.
    ///
    /// # Errors
    ///
    /// Fails when `server.http_addr` is not a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.http_addr.parse().map_err(|_| {
            ConfigError::invalid(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            )
        })
    }

    /// Checks cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service.name.trim().is_empty() {
            return Err(ConfigError::invalid("service.name", "must not be empty"));
        }

        self.socket_addr()?;

        if self.server.shutdown_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "server.shutdown_timeout_secs",
                "must be positive",
            ));
        }

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::invalid("server.max_body_bytes", "must be positive"));
        }

        for entry in self.negotiation.default_accept.split(',') {
            ContentType::parse(entry.trim()).map_err(|e| {
                ConfigError::invalid("negotiation.default_accept", e.to_string())
            })?;
        }

        if self.security.realm.contains('"') {
            return Err(ConfigError::invalid("security.realm", "must not contain quotes"));
        }

        Ok(())
    }
}
