//! The inbound request seen by pipelines.

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, Uri};
use serde::{Deserialize, Serialize};
use sluice_router::Params;
use uuid::Uuid;

use crate::content_type::ContentType;

/// A unique identifier for each request, using UUID v7.
///
/// UUID v7 is time-ordered, which keeps log lines for one request easy to
/// correlate and sort.
///
/// # Example
///
/// ```
/// use sluice_core::RequestId;
///
/// let id = RequestId::new();
/// assert_ne!(id, RequestId::new());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new unique request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for RequestId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// A fully buffered HTTP request.
///
/// Immutable once handed to an endpoint; every [`Exchange`](crate::Exchange)
/// copy shares the same instance.
#[derive(Debug, Clone)]
pub struct Request {
    id: RequestId,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    path_params: Params,
}

impl Request {
    /// Creates a request with no headers and an empty body.
    #[must_use]
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            id: RequestId::new(),
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
            path_params: Params::new(),
        }
    }

    /// Replaces the headers.
    #[must_use]
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Appends one header; names and values that are not valid HTTP are skipped.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        match (
            http::header::HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::warn!(header = name, "ignoring invalid request header"),
        }
        self
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the parameters captured from the path template.
    #[must_use]
    pub fn with_path_params(mut self, params: Params) -> Self {
        self.path_params = params;
        self
    }

    /// Request identifier for log correlation.
    #[must_use]
    pub fn id(&self) -> RequestId {
        self.id
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Full request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// URI path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Raw query string, if any.
    #[must_use]
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// All request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Parsed `Content-Type` header; `None` when absent or malformed.
    #[must_use]
    pub fn content_type(&self) -> Option<ContentType> {
        self.header(http::header::CONTENT_TYPE.as_str())
            .and_then(|raw| ContentType::parse(raw).ok())
    }

    /// Raw `Accept` header.
    #[must_use]
    pub fn accept(&self) -> Option<&str> {
        self.header(http::header::ACCEPT.as_str())
    }

    /// Buffered body bytes.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Parameters captured from the path template.
    #[must_use]
    pub fn path_params(&self) -> &Params {
        &self.path_params
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(request: http::Request<Bytes>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            id: RequestId::new(),
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
            path_params: Params::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_accessors() {
        let request = Request::new(Method::POST, Uri::from_static("/users?page=2"))
            .with_header("content-type", "application/json; charset=utf-8")
            .with_header("accept", "text/html")
            .with_body("{}");

        assert_eq!(request.method(), Method::POST);
        assert_eq!(request.path(), "/users");
        assert_eq!(request.query_string(), Some("page=2"));
        assert_eq!(request.accept(), Some("text/html"));
        assert_eq!(request.content_type().unwrap().essence(), "application/json");
        assert_eq!(request.body().as_ref(), b"{}");
    }

    #[test]
    fn test_invalid_header_skipped() {
        let request = Request::new(Method::GET, Uri::from_static("/"))
            .with_header("bad header", "x");
        assert!(request.headers().is_empty());
    }

    #[test]
    fn test_malformed_content_type_is_none() {
        let request = Request::new(Method::GET, Uri::from_static("/"))
            .with_header("content-type", "nonsense");
        assert!(request.content_type().is_none());
    }

    #[test]
    fn test_from_http_request() {
        let http_request = http::Request::builder()
            .method(Method::PUT)
            .uri("/items/3")
            .header("x-trace", "abc")
            .body(Bytes::from_static(b"hi"))
            .unwrap();

        let request = Request::from(http_request);
        assert_eq!(request.method(), Method::PUT);
        assert_eq!(request.header("x-trace"), Some("abc"));
        assert_eq!(request.body().as_ref(), b"hi");
        assert!(request.path_params().is_empty());
    }
}
