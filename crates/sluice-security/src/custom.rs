//! Closure-backed security schemes.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use sluice_core::schema::{Field, Location, Schema, Type};
use sluice_core::{Exchange, Outcome};
use sluice_pipeline::SecurityScheme;

type Handler = Arc<dyn Fn(Exchange, &[String]) -> Outcome + Send + Sync>;

/// A scheme whose check is a closure.
///
/// ```rust
/// use sluice_core::ErrorCategory;
/// use sluice_security::FnScheme;
///
/// let api_key = FnScheme::new("api-key", |ex, _scopes| {
///     if ex.request().header("x-api-key") == Some("s3cret") {
///         ex.proceed()
///     } else {
///         ex.fail(ErrorCategory::Authentication, [("x-api-key".into(), "Invalid key".into())])
///     }
/// })
/// .header("x-api-key")
/// .document(serde_json::json!({"type": "apiKey", "in": "header", "name": "x-api-key"}));
/// ```
#[derive(Clone)]
pub struct FnScheme {
    name: String,
    handler: Handler,
    documentation: Value,
    headers: Option<Schema>,
}

impl FnScheme {
    /// Creates a scheme named `name` that runs `handler`.
    pub fn new<F>(name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(Exchange, &[String]) -> Outcome + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            handler: Arc::new(handler),
            documentation: json!({"type": "custom"}),
            headers: None,
        }
    }

    /// Sets the documentation fragment.
    #[must_use]
    pub fn document(mut self, documentation: Value) -> Self {
        self.documentation = documentation;
        self
    }

    /// Declares a header the scheme reads; its value never reaches params.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>) -> Self {
        let field = Field::new(Type::string())
            .optional()
            .sensitive()
            .at(Location::Header);
        self.headers = Some(self.headers.take().unwrap_or_default().field(name, field));
        self
    }
}

impl SecurityScheme for FnScheme {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, exchange: Exchange, scopes: &[String]) -> Outcome {
        (self.handler)(exchange, scopes)
    }

    fn documentation(&self) -> Value {
        self.documentation.clone()
    }

    fn header_schema(&self) -> Option<&Schema> {
        self.headers.as_ref()
    }
}

impl fmt::Debug for FnScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnScheme")
            .field("name", &self.name)
            .field("documentation", &self.documentation)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode, Uri};
    use sluice_core::{ErrorCategory, Request};

    fn exchange(key: Option<&str>) -> Exchange {
        let request = Request::new(Method::GET, Uri::from_static("/"));
        let request = match key {
            Some(key) => request.with_header("x-api-key", key),
            None => request,
        };
        Exchange::new(request)
    }

    fn api_key() -> FnScheme {
        FnScheme::new("api-key", |ex: Exchange, scopes: &[String]| {
            match ex.request().header("x-api-key") {
                Some("admin") => ex.proceed(),
                Some(_) if scopes.is_empty() => ex.proceed(),
                Some(_) => ex.fail(ErrorCategory::Authorization, []),
                None => ex.fail(ErrorCategory::Authentication, []),
            }
        })
        .header("x-api-key")
    }

    #[test]
    fn test_handler_receives_scopes() {
        let scheme = api_key();
        let admin = vec!["admin".to_string()];

        assert!(!scheme.handle(exchange(Some("admin")), &admin).is_halted());
        assert!(!scheme.handle(exchange(Some("user")), &[]).is_halted());

        let denied = scheme.handle(exchange(Some("user")), &admin);
        assert_eq!(denied.exchange().status(), StatusCode::FORBIDDEN);

        let missing = scheme.handle(exchange(None), &[]);
        assert_eq!(missing.exchange().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_header_schema() {
        let scheme = api_key();
        let headers = scheme.header_schema().unwrap();
        let field = headers.get("x-api-key").unwrap();
        assert_eq!(field.location(), Some(Location::Header));
        assert!(field.is_sensitive());
    }

    #[test]
    fn test_default_documentation() {
        let scheme = FnScheme::new("noop", |ex: Exchange, _: &[String]| ex.proceed());
        assert_eq!(scheme.documentation(), json!({"type": "custom"}));
        assert!(scheme.header_schema().is_none());
    }
}
