//! Path templates and radix-tree routing for Sluice.
//!
//! Endpoints are keyed by verb + path template. This crate parses templates
//! (`/users/:id`, `/files/*path`), reports their capture tokens so an
//! endpoint can derive implicit path parameters, and matches concrete paths
//! back to registered values.
//!
//! # Example
//!
//! ```rust
//! use sluice_router::{PathTemplate, RouteMatch, Router};
//! use http::Method;
//!
//! let mut router = Router::new();
//! let users = PathTemplate::parse("/users/:id").unwrap();
//! router.insert(&users, &Method::GET, "getUser").unwrap();
//! let files = PathTemplate::parse("/files/*path").unwrap();
//! router.insert(&files, &Method::GET, "serveFile").unwrap();
//!
//! assert!(matches!(router.match_route(&Method::GET, "/users/1"), RouteMatch::Found { .. }));
//! assert!(matches!(
//!     router.match_route(&Method::PUT, "/users/1"),
//!     RouteMatch::MethodNotAllowed { .. }
//! ));
//! ```
//!
//! # Architecture
//!
//! ```text
//!                    (root)
//!                      │
//!              ┌───────┴───────┐
//!            "users"        "files"
//!              │               │
//!            ":id"          "*path"
//!           [GET]            [GET]
//! ```

#![doc(html_root_url = "https://docs.rs/sluice-router/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod method_router;
mod node;
mod params;
mod router;
mod template;

pub use error::RouteError;
pub use method_router::MethodRouter;
pub use node::Node;
pub use params::Params;
pub use router::{RouteMatch, Router};
pub use template::{PathTemplate, Segment};
