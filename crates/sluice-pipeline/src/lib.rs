//! # Sluice Pipeline
//!
//! Request processing for Sluice: steps, the pipeline engine, validation
//! stages, serializers, responders and their registry, security steps,
//! endpoints and the service dispatcher.
//!
//! ## Flow
//!
//! ```text
//! Request → Service (verb + path) → Endpoint
//!   ├─ steps in the order the endpoint declared them, of any kind
//!   │    a halt skips the rest
//!   ├─ resume, then ResponderRegistry::resolve(status, Accept)
//!   └─ Responder: steps, Content-Type, serialized body
//! ```
//!
//! ## Example
//!
//! ```rust
//! use http::{Method, StatusCode, Uri};
//! use serde_json::json;
//! use sluice_core::schema::{Schema, Type};
//! use sluice_core::{Exchange, Request};
//! use sluice_pipeline::Endpoint;
//!
//! let endpoint = Endpoint::post("/users")
//!     .payload_schema(Schema::new().field("name", Type::string()))
//!     .step_fn("create", |ex: Exchange| {
//!         let name = ex.param("name").cloned().unwrap_or_default();
//!         ex.with_value(json!({"name": name}))
//!             .with_status(StatusCode::CREATED)
//!             .proceed()
//!     })
//!     .respond(201, |r| {
//!         r.render(|ex: &Exchange| {
//!             ex.value().and_then(|v| v.as_json()).cloned().unwrap_or_default()
//!         })
//!     })
//!     .build()
//!     .unwrap();
//!
//! let request = Request::new(Method::POST, Uri::from_static("/users"))
//!     .with_header("content-type", "application/json")
//!     .with_body(r#"{"name":"Ada"}"#);
//! let exchange = endpoint.run(request);
//!
//! assert_eq!(exchange.status(), StatusCode::CREATED);
//! assert_eq!(exchange.response().body().as_ref(), br#"{"name":"Ada"}"#);
//! ```

#![doc(html_root_url = "https://docs.rs/sluice-pipeline/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod docs;
mod endpoint;
mod pipeline;
mod registry;
mod responder;
mod security;
mod serializer;
mod service;
pub mod stages;
mod step;

pub use docs::{EndpointDoc, ResponderDoc, SecurityDoc};
pub use endpoint::{Endpoint, EndpointBuilder};
pub use pipeline::{Pipeline, PipelineBuilder, SchemaSet};
pub use registry::ResponderRegistry;
pub use responder::{Responder, ResponderBuilder};
pub use security::{SecurityScheme, SecuritySchemes, SecurityStep, SharedScheme};
pub use serializer::{
    DefaultEntity, Entity, InlineBuilder, InlineFn, InlineSerializers, RenderError, Serializer,
    Template,
};
pub use service::{Service, ServiceBuilder};
pub use stages::{HeaderValidation, PayloadValidation, QueryValidation};
pub use step::{BoxedStep, FnStep, Step};
