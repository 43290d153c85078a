//! # Sluice Test
//!
//! In-memory testing for Sluice services. Requests go through routing,
//! validation, security and negotiation exactly as they would behind
//! `sluice-server`, but without binding a port or starting a runtime.
//!
//! ```ignore
//! use sluice_test::TestClient;
//! use serde_json::json;
//!
//! let client = TestClient::new(service);
//!
//! client
//!     .post("/users")
//!     .json(&json!({}))
//!     .send()
//!     .assert_status(StatusCode::UNPROCESSABLE_ENTITY)
//!     .assert_json_field("errors.name", &json!("Is required"));
//! ```

#![doc(html_root_url = "https://docs.rs/sluice-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod request;
mod response;

pub use client::{TestClient, TestClientRequest};
pub use error::TestError;
pub use request::TestRequest;
pub use response::TestResponse;
