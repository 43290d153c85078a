//! # Sluice Server
//!
//! Runs a [`sluice_pipeline::Service`] on hyper and tokio.
//!
//! The pipeline itself is synchronous; this crate owns the async parts:
//! accepting connections, buffering bodies under a size limit, and graceful
//! shutdown on SIGTERM/SIGINT.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sluice_config::ConfigLoader;
//! use sluice_server::Server;
//!
//! let config = ConfigLoader::new().with_optional_file("sluice.toml")?.load()?;
//! Server::from_config(Arc::new(service), &config).run().await?;
//! ```

#![doc(html_root_url = "https://docs.rs/sluice-server/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod server;
mod shutdown;

pub use error::ServerError;
pub use server::{Server, DEFAULT_ADDR, DEFAULT_MAX_BODY_BYTES, DEFAULT_SHUTDOWN_TIMEOUT};
pub use shutdown::{ConnectionGuard, ConnectionTracker, ShutdownSignal};
