//! Documentation model for endpoints.
//!
//! Exporters (OpenAPI and the like) walk these structures; none ships here.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use sluice_core::{ContentType, StatusRange};

/// One endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointDoc {
    /// HTTP verb
    pub method: String,
    /// Path template, e.g. `/users/:id`
    pub path: String,
    /// Human description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Path and query fields
    pub parameters: Value,
    /// Header fields
    pub headers: Value,
    /// Body fields per content type
    pub payloads: IndexMap<String, Value>,
    /// Registered responders, built-in ones included
    pub responders: Vec<ResponderDoc>,
    /// Security requirements in declaration order
    pub security: Vec<SecurityDoc>,
}

/// One responder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponderDoc {
    /// Handled statuses
    pub statuses: StatusRange,
    /// Emitted content type
    pub content_type: ContentType,
    /// Human description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One security requirement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityDoc {
    /// Scheme name
    pub scheme: String,
    /// Required scopes
    pub scopes: Vec<String>,
    /// The scheme's own documentation fragment
    pub definition: Value,
}
