//! # Sluice Security
//!
//! Security schemes that plug into endpoints through
//! [`SecurityScheme`](sluice_pipeline::SecurityScheme):
//!
//! - [`Bearer`] resolves `Authorization: Bearer` tokens through a
//!   [`TokenStore`] and checks scopes, or hands the decision to an
//!   authorizer closure
//! - [`Basic`] checks `Authorization: Basic` credentials against a
//!   [`CredentialStore`]
//! - [`FnScheme`] wraps any closure
//!
//! Failures halt the exchange: missing or unknown credentials with 401 and a
//! `WWW-Authenticate` challenge, insufficient permissions with 403.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use http::{Method, StatusCode, Uri};
//! use sluice_core::Request;
//! use sluice_pipeline::Endpoint;
//! use sluice_security::{Bearer, StaticTokenStore};
//!
//! let bearer = Arc::new(Bearer::new(StaticTokenStore::new().with_token("admintoken", ["write"])));
//! let endpoint = Endpoint::post("/posts")
//!     .security(bearer, ["write"])
//!     .build()
//!     .unwrap();
//!
//! let denied = endpoint.run(Request::new(Method::POST, Uri::from_static("/posts")));
//! assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
//!
//! let allowed = endpoint.run(
//!     Request::new(Method::POST, Uri::from_static("/posts"))
//!         .with_header("authorization", "Bearer admintoken"),
//! );
//! assert_eq!(allowed.status(), StatusCode::OK);
//! ```

#![doc(html_root_url = "https://docs.rs/sluice-security/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod basic;
mod bearer;
mod challenge;
mod custom;
mod token;

pub use basic::{Basic, CredentialStore, StaticCredentials};
pub use bearer::{Authorizer, Bearer};
pub use custom::FnScheme;
pub use token::{
    AccessToken, ResolvedTokens, ScopedToken, SharedToken, StaticTokenStore, TokenStore,
};

/// Realm announced when none is configured.
pub const DEFAULT_REALM: &str = "sluice";
