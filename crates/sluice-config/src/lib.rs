//! Typed configuration for Sluice services.
//!
//! - TOML and JSON files, merged key by key over defaults
//! - `.env` files and `SLUICE__SECTION__KEY` environment overrides
//! - strict parsing: unknown keys are errors
//! - validation of the merged result
//!
//! # Example
//!
//! ```no_run
//! use sluice_config::ConfigLoader;
//!
//! # fn main() -> Result<(), sluice_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_file("sluice.toml")?
//!     .with_env_prefix("BLOG")
//!     .load()?;
//!
//! sluice_telemetry::init_logging(&config.log_config()).ok();
//! println!("listening on {}", config.server.http_addr);
//! # Ok(())
//! # }
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Field |
//! |----------|-------|
//! | `SLUICE__SERVICE__NAME` | `service.name` |
//! | `SLUICE__SERVER__HTTP_ADDR` | `server.http_addr` |
//! | `SLUICE__SERVER__SHUTDOWN_TIMEOUT_SECS` | `server.shutdown_timeout_secs` |
//! | `SLUICE__SERVER__MAX_BODY_BYTES` | `server.max_body_bytes` |
//! | `SLUICE__NEGOTIATION__DEFAULT_ACCEPT` | `negotiation.default_accept` |
//! | `SLUICE__SECURITY__REALM` | `security.realm` |
//! | `SLUICE__LOGGING__LEVEL` | `logging.level` |
//! | `SLUICE__LOGGING__FORMAT` | `logging.format` (`json` or `pretty`) |

#![doc(html_root_url = "https://docs.rs/sluice-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::SluiceConfig;
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{
    LogFormat, LoggingConfig, NegotiationConfig, SecurityConfig, ServerConfig, ServiceConfig,
};
