//! # Sluice Extract
//!
//! Decoding of raw request input into JSON maps that schemas resolve.
//!
//! Nothing here validates or coerces: query strings and forms stay strings,
//! JSON keeps its own types, and schema resolution in the pipeline decides
//! what the values mean.
//!
//! - [`parse_query`]: query string parameters
//! - [`decode_body`]: JSON, URL-encoded and multipart bodies by Content-Type
//! - [`headers_to_map`]: request headers under lowercase names
//!
//! Multipart file parts are summarised in the field map and kept whole in
//! [`UploadedFiles`].

#![doc(html_root_url = "https://docs.rs/sluice-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod body;
mod error;
mod header;
mod multipart;
mod query;

pub use body::{decode_body, parse_json_object, DecodedBody, DEFAULT_MAX_BODY_SIZE};
pub use error::{ExtractionError, ExtractionSource};
pub use header::headers_to_map;
pub use multipart::{parse_multipart, MultipartForm, UploadedFile, UploadedFiles};
pub use query::{parse_form, parse_query};
