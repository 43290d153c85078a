//! The mutable response holder carried by an exchange.

use bytes::Bytes;
use http::header::{HeaderName, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, StatusCode};

use crate::content_type::ContentType;

/// Status, headers and body produced by a pipeline.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }
}

impl Response {
    /// A 200 response with no headers and an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Sets the status.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Mutable response headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// First value of a header, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Replaces a header; values that are not valid HTTP are dropped with a warning.
    pub fn set_header(&mut self, name: HeaderName, value: &str) {
        match HeaderValue::from_str(value) {
            Ok(value) => {
                self.headers.insert(name, value);
            }
            Err(e) => {
                tracing::warn!(header = %name, error = %e, "dropping invalid response header");
            }
        }
    }

    /// `Content-Type` header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    /// Sets the `Content-Type` header.
    pub fn set_content_type(&mut self, content_type: &ContentType) {
        self.set_header(CONTENT_TYPE, &content_type.to_string());
    }

    /// Response body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Replaces the body.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    /// Converts into an `http` response.
    #[must_use]
    pub fn into_http(self) -> http::Response<Bytes> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_response() {
        let response = Response::new();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.body().is_empty());
        assert!(response.content_type().is_none());
    }

    #[test]
    fn test_set_content_type() {
        let mut response = Response::new();
        response.set_content_type(&ContentType::parse("text/html; charset=utf-8").unwrap());
        assert_eq!(response.content_type(), Some("text/html; charset=utf-8"));
    }

    #[test]
    fn test_invalid_header_dropped() {
        let mut response = Response::new();
        response.set_header(HeaderName::from_static("x-test"), "bad\nvalue");
        assert!(response.header("x-test").is_none());
    }

    #[test]
    fn test_into_http() {
        let mut response = Response::new();
        response.set_status(StatusCode::CREATED);
        response.set_body("done");
        response.set_header(HeaderName::from_static("x-id"), "7");

        let http = response.into_http();
        assert_eq!(http.status(), StatusCode::CREATED);
        assert_eq!(http.headers()["x-id"], "7");
        assert_eq!(http.body().as_ref(), b"done");
    }
}
