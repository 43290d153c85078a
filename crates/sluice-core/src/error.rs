//! Error types for Sluice.
//!
//! Two families live here:
//!
//! | Type | When | Propagation |
//! |---|---|---|
//! | [`ConfigurationError`] | service definition time | returned from `build()`, fatal |
//! | [`ErrorCategory`] | per request | recorded on the [`Exchange`](crate::Exchange), never returned |
//!
//! Per-request failures are data: a step writes field messages into the
//! exchange's [`ErrorMap`], sets the status for the category and halts.

use http::StatusCode;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Field name → human-readable message.
pub type ErrorMap = IndexMap<String, String>;

/// A string that does not follow the `type/subtype` grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid content type '{input}': {reason}")]
pub struct FormatError {
    /// The rejected input
    pub input: String,
    /// What is wrong with it
    pub reason: &'static str,
}

impl FormatError {
    pub(crate) fn new(input: impl Into<String>, reason: &'static str) -> Self {
        Self {
            input: input.into(),
            reason,
        }
    }
}

/// Invalid setup detected while defining a service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// A content type string failed to parse.
    #[error(transparent)]
    InvalidContentType(#[from] FormatError),

    /// A status range whose start is greater than its end.
    #[error("invalid status range {start}..={end}")]
    InvalidStatusRange {
        /// Range start
        start: u16,
        /// Range end
        end: u16,
    },

    /// A second serializer registered on one responder.
    #[error("serializer already registered for responder {content_type}")]
    DuplicateSerializer {
        /// The responder's content type
        content_type: String,
    },

    /// A security requirement names a scheme nobody registered.
    #[error("unknown security scheme '{name}'")]
    UnknownSecurityScheme {
        /// Requested scheme name
        name: String,
    },

    /// An inline serializer for a subtype with no registered builder.
    #[error("no inline serializer builder registered for subtype '{subtype}'")]
    UnknownInlineSerializer {
        /// Content type subtype
        subtype: String,
    },

    /// A response template that does not compile.
    #[error("invalid template '{name}': {reason}")]
    InvalidTemplate {
        /// Template name
        name: String,
        /// Compiler message
        reason: String,
    },

    /// Verb + path registered twice, or another routing conflict.
    #[error("route conflict: {0}")]
    Route(#[from] sluice_router::RouteError),
}

impl From<std::convert::Infallible> for ConfigurationError {
    fn from(never: std::convert::Infallible) -> Self {
        match never {}
    }
}

/// Categories of per-request failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Schema resolution failed for path, query, header or body fields.
    Validation,
    /// Request body could not be decoded for its content type.
    BodyParse,
    /// Credentials missing or not recognised.
    Authentication,
    /// Credentials valid but not permitted.
    Authorization,
}

impl ErrorCategory {
    /// Returns the HTTP status code used for this category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BodyParse => StatusCode::BAD_REQUEST,
            Self::Authentication => StatusCode::UNAUTHORIZED,
            Self::Authorization => StatusCode::FORBIDDEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_status_codes() {
        assert_eq!(ErrorCategory::Validation.default_status_code(), 422);
        assert_eq!(ErrorCategory::BodyParse.default_status_code(), 400);
        assert_eq!(ErrorCategory::Authentication.default_status_code(), 401);
        assert_eq!(ErrorCategory::Authorization.default_status_code(), 403);
    }

    #[test]
    fn test_format_error_converts() {
        let err: ConfigurationError = FormatError::new("json/", "empty subtype").into();
        assert_eq!(
            err.to_string(),
            "invalid content type 'json/': empty subtype"
        );
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&ErrorCategory::BodyParse).unwrap();
        assert_eq!(json, "\"body_parse\"");
    }
}
