//! In-memory client.

use std::sync::Arc;

use http::Method;
use serde::Serialize;
use sluice_core::ConfigurationError;
use sluice_pipeline::{Endpoint, Service};

use crate::error::TestError;
use crate::request::TestRequest;
use crate::response::TestResponse;

/// Sends requests straight into a [`Service`] without a socket.
///
/// ```
/// use sluice_pipeline::{Endpoint, Service};
/// use sluice_test::TestClient;
/// use http::StatusCode;
///
/// let service = Service::builder("demo")
///     .endpoint(Endpoint::get("/ping").build().unwrap())
///     .build()
///     .unwrap();
///
/// let client = TestClient::new(service);
/// client.get("/ping").send().assert_status(StatusCode::OK);
/// client.get("/pong").send().assert_status(StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Clone)]
pub struct TestClient {
    service: Arc<Service>,
    default_headers: Vec<(String, String)>,
}

impl TestClient {
    /// A client for `service`.
    pub fn new(service: impl Into<Arc<Service>>) -> Self {
        Self {
            service: service.into(),
            default_headers: Vec::new(),
        }
    }

    /// A client for a single endpoint, served at its own template.
    pub fn for_endpoint(endpoint: Endpoint) -> Result<Self, ConfigurationError> {
        let service = Service::builder("test").endpoint(endpoint).build()?;
        Ok(Self::new(service))
    }

    /// Adds a header to every request.
    #[must_use]
    pub fn with_default_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    /// The wrapped service.
    #[must_use]
    pub fn service(&self) -> &Arc<Service> {
        &self.service
    }

    /// Starts a GET request.
    pub fn get(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::GET, uri)
    }

    /// Starts a POST request.
    pub fn post(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::POST, uri)
    }

    /// Starts a PUT request.
    pub fn put(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::PUT, uri)
    }

    /// Starts a PATCH request.
    pub fn patch(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::PATCH, uri)
    }

    /// Starts a DELETE request.
    pub fn delete(&self, uri: impl Into<String>) -> TestClientRequest<'_> {
        self.request(Method::DELETE, uri)
    }

    /// Starts a request with any method.
    pub fn request(&self, method: Method, uri: impl Into<String>) -> TestClientRequest<'_> {
        let request = self
            .default_headers
            .iter()
            .fold(TestRequest::new(method, uri), |r, (name, value)| r.header(name, value));
        TestClientRequest {
            client: self,
            request,
        }
    }

    /// Sends a prepared request.
    pub fn send(&self, request: TestRequest) -> Result<TestResponse, TestError> {
        let request = request.build()?;
        Ok(TestResponse::from_http(self.service.handle(request)))
    }
}

/// A [`TestRequest`] bound to a client.
#[derive(Debug)]
#[must_use]
pub struct TestClientRequest<'a> {
    client: &'a TestClient,
    request: TestRequest,
}

impl TestClientRequest<'_> {
    /// Sets a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.request = self.request.header(name, value);
        self
    }

    /// Sets the `Accept` header.
    pub fn accept(mut self, accept: impl AsRef<str>) -> Self {
        self.request = self.request.accept(accept);
        self
    }

    /// Sets the `Content-Type` header.
    pub fn content_type(mut self, content_type: impl AsRef<str>) -> Self {
        self.request = self.request.content_type(content_type);
        self
    }

    /// Sends a bearer token.
    pub fn bearer_token(mut self, token: impl AsRef<str>) -> Self {
        self.request = self.request.bearer_token(token);
        self
    }

    /// Sends basic credentials.
    pub fn basic_auth(mut self, user: &str, password: &str) -> Self {
        self.request = self.request.basic_auth(user, password);
        self
    }

    /// Appends query pairs.
    pub fn query<T: Serialize + ?Sized>(mut self, pairs: &T) -> Self {
        self.request = self.request.query(pairs);
        self
    }

    /// Sets the raw body.
    pub fn body(mut self, body: impl Into<bytes::Bytes>) -> Self {
        self.request = self.request.body(body);
        self
    }

    /// Sets a JSON body.
    pub fn json<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.request = self.request.json(value);
        self
    }

    /// Sets a form body.
    pub fn form<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        self.request = self.request.form(value);
        self
    }

    /// Sends the request.
    ///
    /// # Panics
    ///
    /// Panics when the request could not be built; use
    /// [`try_send`](Self::try_send) to get the error instead.
    pub fn send(self) -> TestResponse {
        match self.try_send() {
            Ok(response) => response,
            Err(e) => panic!("failed to build test request: {e}"),
        }
    }

    /// Sends the request, returning build errors.
    pub fn try_send(self) -> Result<TestResponse, TestError> {
        self.client.send(self.request)
    }
}
