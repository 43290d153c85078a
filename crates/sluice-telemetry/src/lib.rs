//! # Sluice Telemetry
//!
//! Logging setup for Sluice services. Every Sluice crate logs through
//! [`tracing`] macros with structured fields; this crate installs the
//! subscriber that formats them.
//!
//! | Config | Output |
//! |--------|--------|
//! | [`LogConfig::development`] | pretty, `debug`, span events, file and line |
//! | [`LogConfig::production`] | JSON lines, `info` |
//!
//! Field names shared across crates live in [`fields`].

#![doc(html_root_url = "https://docs.rs/sluice-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, request_span, LogConfig};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
