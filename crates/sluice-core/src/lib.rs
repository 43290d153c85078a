//! # Sluice Core
//!
//! Foundational types shared by every Sluice crate:
//!
//! | Type | Role |
//! |------|------|
//! | [`ContentType`] | MIME parsing, `Accept` negotiation order |
//! | [`StatusMap`] | status code → handler over overlapping ranges |
//! | [`Exchange`] / [`Outcome`] | per-request state, continue or halt |
//! | [`Request`] / [`Response`] | buffered HTTP request, mutable response |
//! | [`schema::Schema`] | field declarations, merge and resolution |
//! | [`ConfigurationError`] | definition-time failures |

#![doc(html_root_url = "https://docs.rs/sluice-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod content_type;
mod error;
mod exchange;
mod request;
mod response;
pub mod schema;
mod status_map;

pub use content_type::{ContentType, WILDCARD};
pub use error::{ConfigurationError, ErrorCategory, ErrorMap, FormatError};
pub use exchange::{Exchange, Extensions, Outcome, ParamMap, Payload};
pub use request::{Request, RequestId};
pub use response::Response;
pub use status_map::{StatusMap, StatusRange};
