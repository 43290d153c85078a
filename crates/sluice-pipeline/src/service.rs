//! Verb + path dispatch across endpoints.

use std::sync::Arc;

use bytes::Bytes;
use http::header::ALLOW;
use http::StatusCode;
use serde_json::json;
use sluice_core::{ConfigurationError, ContentType, Request, Response};
use sluice_router::{RouteMatch, Router};

use crate::docs::EndpointDoc;
use crate::endpoint::Endpoint;

/// A set of endpoints routed by verb and path.
///
/// ```rust
/// use bytes::Bytes;
/// use http::StatusCode;
/// use sluice_pipeline::{Endpoint, Service};
///
/// let service = Service::builder("users")
///     .endpoint(Endpoint::get("/users/:id").build().unwrap())
///     .build()
///     .unwrap();
///
/// let request = http::Request::get("/users/7").body(Bytes::new()).unwrap();
/// assert_eq!(service.handle(request).status(), StatusCode::OK);
///
/// let request = http::Request::delete("/users/7").body(Bytes::new()).unwrap();
/// assert_eq!(service.handle(request).status(), StatusCode::METHOD_NOT_ALLOWED);
/// ```
#[derive(Debug)]
pub struct Service {
    name: String,
    router: Router<Arc<Endpoint>>,
    endpoints: Vec<Arc<Endpoint>>,
}

impl Service {
    /// Starts a service.
    pub fn builder(name: impl Into<String>) -> ServiceBuilder {
        ServiceBuilder {
            name: name.into(),
            router: Router::new(),
            endpoints: Vec::new(),
            error: None,
        }
    }

    /// Service name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Routes `request` and runs the matching endpoint.
    ///
    /// Unknown paths get 404 and known paths with another verb get 405 with
    /// an `Allow` header, both with a JSON `{message}` body.
    pub fn dispatch(&self, request: Request) -> Response {
        match self.router.match_route(request.method(), request.path()) {
            RouteMatch::Found { value, params } => {
                let endpoint = Arc::clone(value);
                endpoint.run(request.with_path_params(params)).into_response()
            }
            RouteMatch::MethodNotAllowed { allowed } => {
                tracing::debug!(
                    method = %request.method(),
                    path = request.path(),
                    "method not allowed"
                );
                let allow = allowed
                    .iter()
                    .map(http::Method::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                let mut response = error_response(
                    StatusCode::METHOD_NOT_ALLOWED,
                    &format!("method {} not allowed for {}", request.method(), request.path()),
                );
                response.set_header(ALLOW, &allow);
                response
            }
            RouteMatch::NotFound => {
                tracing::debug!(method = %request.method(), path = request.path(), "no route");
                error_response(
                    StatusCode::NOT_FOUND,
                    &format!("no route for {} {}", request.method(), request.path()),
                )
            }
        }
    }

    /// Handles a buffered `http` request.
    pub fn handle(&self, request: http::Request<Bytes>) -> http::Response<Bytes> {
        self.dispatch(Request::from(request)).into_http()
    }

    /// Endpoints in registration order.
    pub fn endpoints(&self) -> impl Iterator<Item = &Arc<Endpoint>> {
        self.endpoints.iter()
    }

    /// Documentation for every endpoint.
    #[must_use]
    pub fn documentation(&self) -> Vec<EndpointDoc> {
        self.endpoints.iter().map(|e| e.documentation()).collect()
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    let mut response = Response::new();
    response.set_status(status);
    response.set_content_type(&ContentType::json());
    response.set_body(json!({ "message": message }).to_string());
    response
}

/// Builder for [`Service`].
#[derive(Debug)]
pub struct ServiceBuilder {
    name: String,
    router: Router<Arc<Endpoint>>,
    endpoints: Vec<Arc<Endpoint>>,
    error: Option<ConfigurationError>,
}

impl ServiceBuilder {
    /// Adds an endpoint under its verb and path template.
    #[must_use]
    pub fn endpoint(mut self, endpoint: Endpoint) -> Self {
        let endpoint = Arc::new(endpoint);
        let inserted = self.router.insert(
            endpoint.template(),
            endpoint.method(),
            Arc::clone(&endpoint),
        );
        match inserted {
            Ok(()) => self.endpoints.push(endpoint),
            Err(e) => {
                self.error.get_or_insert(e.into());
            }
        }
        self
    }

    /// Freezes the service.
    ///
    /// # Errors
    ///
    /// Returns the first routing conflict, such as a duplicate verb + path.
    pub fn build(self) -> Result<Service, ConfigurationError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        tracing::debug!(service = %self.name, endpoints = self.endpoints.len(), "service built");
        Ok(Service {
            name: self.name,
            router: self.router,
            endpoints: self.endpoints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;
    use serde_json::Value;
    use sluice_core::Exchange;

    fn service() -> Service {
        Service::builder("test")
            .endpoint(
                Endpoint::get("/users/:id")
                    .step_fn("echo", |ex: Exchange| {
                        let id = ex.param("id").cloned().unwrap_or_default();
                        ex.with_param("seen", id).proceed()
                    })
                    .build()
                    .unwrap(),
            )
            .endpoint(Endpoint::post("/users").build().unwrap())
            .endpoint(Endpoint::get("/users").build().unwrap())
            .build()
            .unwrap()
    }

    fn call(service: &Service, method: Method, uri: &str) -> http::Response<Bytes> {
        let request = http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::new())
            .unwrap();
        service.handle(request)
    }

    fn json_body(response: &http::Response<Bytes>) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[test]
    fn test_routes_and_fills_path_params() {
        let response = call(&service(), Method::GET, "/users/9");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(&response)["params"]["seen"], "9");
    }

    #[test]
    fn test_not_found() {
        let response = call(&service(), Method::GET, "/posts");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(&response)["message"], "no route for GET /posts");
    }

    #[test]
    fn test_method_not_allowed() {
        let response = call(&service(), Method::DELETE, "/users");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let allow = response.headers()[ALLOW].to_str().unwrap();
        assert!(allow.contains("GET"));
        assert!(allow.contains("POST"));
    }

    #[test]
    fn test_duplicate_route() {
        let err = Service::builder("dup")
            .endpoint(Endpoint::get("/a").build().unwrap())
            .endpoint(Endpoint::get("/a").build().unwrap())
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigurationError::Route(_)));
    }

    #[test]
    fn test_documentation() {
        let docs = service().documentation();
        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0].path, "/users/:id");
    }
}
