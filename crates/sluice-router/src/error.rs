//! Router errors.

use thiserror::Error;

/// Errors raised while registering routes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The path template is malformed.
    #[error("invalid path template '{path}': {reason}")]
    InvalidTemplate {
        /// The offending template
        path: String,
        /// What is wrong with it
        reason: String,
    },

    /// The verb + path pair is already registered.
    #[error("route already registered: {method} {path}")]
    Duplicate {
        /// HTTP method
        method: String,
        /// Path template
        path: String,
    },

    /// Two templates capture the same position under different names.
    #[error("conflicting capture at '{path}': ':{existing}' is already registered here")]
    ConflictingCapture {
        /// Path template being inserted
        path: String,
        /// Name already registered at this position
        existing: String,
    },
}
