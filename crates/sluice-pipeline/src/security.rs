//! The security scheme contract and its pipeline step.
//!
//! A scheme authenticates and authorizes an exchange. Declaring it on an
//! endpoint adds a [`SecurityStep`] in declaration order, like any other
//! step; a scheme's header schema joins the endpoint's header schema.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use sluice_core::schema::Schema;
use sluice_core::{ConfigurationError, Exchange, Outcome};

use crate::step::Step;

/// An authentication and authorization unit.
pub trait SecurityScheme: Send + Sync + 'static {
    /// Unique name used to wire the scheme into endpoints.
    fn name(&self) -> &str;

    /// Checks the exchange against `scopes`; halts with 401/403 on failure.
    fn handle(&self, exchange: Exchange, scopes: &[String]) -> Outcome;

    /// Documentation fragment, e.g. `{"type": "http", "scheme": "bearer"}`.
    fn documentation(&self) -> Value;

    /// Headers the scheme reads.
    fn header_schema(&self) -> Option<&Schema> {
        None
    }
}

/// A shared security scheme.
pub type SharedScheme = Arc<dyn SecurityScheme>;

/// Runs a scheme with a fixed set of required scopes.
#[derive(Clone)]
pub struct SecurityStep {
    scheme: SharedScheme,
    scopes: Vec<String>,
}

impl SecurityStep {
    /// Requires `scopes` from `scheme`.
    pub fn new<I, S>(scheme: SharedScheme, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            scheme,
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    /// The scheme checked by this step.
    #[must_use]
    pub fn scheme(&self) -> &SharedScheme {
        &self.scheme
    }

    /// Required scopes.
    #[must_use]
    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }
}

impl Step for SecurityStep {
    fn name(&self) -> &str {
        "security"
    }

    fn call(&self, exchange: Exchange) -> Outcome {
        tracing::trace!(scheme = self.scheme.name(), scopes = ?self.scopes, "checking security");
        self.scheme.handle(exchange, &self.scopes)
    }

    fn header_schema(&self) -> Option<&Schema> {
        self.scheme.header_schema()
    }
}

impl fmt::Debug for SecurityStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityStep")
            .field("scheme", &self.scheme.name())
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Named schemes an endpoint can refer to.
///
/// ```rust
/// use sluice_pipeline::SecuritySchemes;
///
/// let schemes = SecuritySchemes::new();
/// assert!(schemes.get("bearer").is_err());
/// ```
#[derive(Clone, Default)]
pub struct SecuritySchemes {
    schemes: IndexMap<String, SharedScheme>,
}

impl SecuritySchemes {
    /// An empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a scheme under its own name.
    #[must_use]
    pub fn register(mut self, scheme: SharedScheme) -> Self {
        self.schemes.insert(scheme.name().to_string(), scheme);
        self
    }

    /// Looks up a scheme.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownSecurityScheme`] for an unknown name.
    pub fn get(&self, name: &str) -> Result<&SharedScheme, ConfigurationError> {
        self.schemes
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownSecurityScheme {
                name: name.to_string(),
            })
    }

    /// Registered schemes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &SharedScheme> {
        self.schemes.values()
    }
}

impl fmt::Debug for SecuritySchemes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.schemes.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode, Uri};
    use serde_json::json;
    use sluice_core::schema::{Location, Type};
    use sluice_core::{ErrorCategory, Request};

    struct ApiKey {
        headers: Schema,
    }

    impl ApiKey {
        fn new() -> Self {
            Self {
                headers: Schema::new().field("x-api-key", Type::string().optional()),
            }
        }
    }

    impl SecurityScheme for ApiKey {
        fn name(&self) -> &str {
            "api_key"
        }

        fn handle(&self, exchange: Exchange, scopes: &[String]) -> Outcome {
            match exchange.request().header("x-api-key") {
                Some("secret") if scopes.is_empty() => exchange.proceed(),
                Some("secret") => exchange.fail(
                    ErrorCategory::Authorization,
                    [("x-api-key".to_string(), "Insufficient scope".to_string())],
                ),
                _ => exchange.fail(
                    ErrorCategory::Authentication,
                    [("x-api-key".to_string(), "Is required".to_string())],
                ),
            }
        }

        fn documentation(&self) -> Value {
            json!({"type": "apiKey", "in": "header", "name": "x-api-key"})
        }

        fn header_schema(&self) -> Option<&Schema> {
            Some(&self.headers)
        }
    }

    fn exchange(key: Option<&str>) -> Exchange {
        let mut request = Request::new(Method::GET, Uri::from_static("/"));
        if let Some(key) = key {
            request = request.with_header("x-api-key", key);
        }
        Exchange::new(request)
    }

    #[test]
    fn test_step_delegates_with_scopes() {
        let scheme: SharedScheme = Arc::new(ApiKey::new());

        let open = SecurityStep::new(Arc::clone(&scheme), Vec::<String>::new());
        assert!(!open.call(exchange(Some("secret"))).is_halted());

        let scoped = SecurityStep::new(Arc::clone(&scheme), ["admin"]);
        let outcome = scoped.call(exchange(Some("secret")));
        assert_eq!(outcome.exchange().status(), StatusCode::FORBIDDEN);

        let outcome = open.call(exchange(None));
        assert_eq!(outcome.exchange().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_step_exposes_header_schema() {
        let step = SecurityStep::new(Arc::new(ApiKey::new()), ["read"]);
        let schema = step.header_schema().unwrap();
        assert!(!schema.get("x-api-key").unwrap().is_required());
        assert_eq!(step.scopes(), ["read".to_string()]);

        let located = schema.clone().located(Location::Header);
        assert_eq!(located.get("x-api-key").unwrap().location(), Some(Location::Header));
    }

    #[test]
    fn test_registry_lookup() {
        let schemes = SecuritySchemes::new().register(Arc::new(ApiKey::new()));
        assert_eq!(schemes.get("api_key").unwrap().name(), "api_key");
        assert_eq!(
            schemes.get("oauth").err(),
            Some(ConfigurationError::UnknownSecurityScheme {
                name: "oauth".to_string()
            })
        );
        assert_eq!(schemes.iter().count(), 1);
    }
}
