//! # Sluice
//!
//! Declarative HTTP endpoints built from small steps.
//!
//! An endpoint is a pipeline: query, header and body fields are validated
//! against schemas, security schemes check credentials, custom steps add
//! parameters, and a responder chosen by status and `Accept` header renders
//! the result.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sluice::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_optional_file("sluice.toml")?.load()?;
//!     init_logging(&config.log_config())?;
//!
//!     let user_page = Template::new("user", "<p>{{ params.id }}</p>")?;
//!     let service = Service::builder(config.service.name.clone())
//!         .endpoint(
//!             Endpoint::get("/users/:id")
//!                 .query_schema(Schema::new().field("id", Type::lax_integer()))
//!                 .respond(200, |r| r.accepts("html").serialize(user_page.clone()))
//!                 .build()?,
//!         )
//!         .build()?;
//!
//!     Server::from_config(Arc::new(service), &config).run().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! ```text
//! Request → Service (verb + path) → Endpoint
//!   ├─ steps run exactly in the order the endpoint declared them
//!   │    security, schema validation and custom steps may interleave freely
//!   │    the first declaration of each schema kind validates the merged schema
//!   │    a halt skips the remaining steps
//!   └─ responder picked by status and Accept renders the response
//! ```

#![doc(html_root_url = "https://docs.rs/sluice/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub use sluice_config as config;
pub use sluice_core as core;
pub use sluice_extract as extract;
pub use sluice_pipeline as pipeline;
pub use sluice_router as router;
pub use sluice_security as security;
pub use sluice_server as server;
pub use sluice_telemetry as telemetry;

/// Common imports.
///
/// ```rust
/// use sluice::prelude::*;
///
/// let endpoint = Endpoint::get("/ping").build().unwrap();
/// assert_eq!(endpoint.method(), Method::GET);
/// ```
pub mod prelude {
    pub use http::{Method, StatusCode};

    pub use sluice_core::schema::{Field, Location, Schema, Type};
    pub use sluice_core::{
        ConfigurationError, ContentType, ErrorCategory, Exchange, Outcome, Request, Response,
    };

    pub use sluice_pipeline::{
        DefaultEntity, Endpoint, FnStep, Pipeline, Responder, SecurityScheme, SecuritySchemes,
        Service, Step, Template,
    };

    pub use sluice_security::{
        AccessToken, Basic, Bearer, FnScheme, ScopedToken, StaticCredentials, StaticTokenStore,
        TokenStore,
    };

    pub use sluice_config::{ConfigLoader, SluiceConfig};
    pub use sluice_server::{Server, ShutdownSignal};
    pub use sluice_telemetry::{init_logging, LogConfig};
}
