//! `Authorization: Bearer` access tokens.
//!
//! ```text
//! header absent / other scheme  → 401
//! token unknown to the store    → 401 (error="invalid_token")
//! token lacks required scopes   → 403
//! otherwise                     → continue
//! ```
//!
//! The token is resolved once per request: later checks by the same scheme
//! reuse it from the exchange's [`ResolvedTokens`] extension and only
//! re-evaluate [`AccessToken::allows`] against their own scopes.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use sluice_core::schema::{Field, Location, Schema, Type};
use sluice_core::{Exchange, Outcome};
use sluice_pipeline::SecurityScheme;

use crate::challenge::{credentials, forbidden, unauthorized};
use crate::token::{ResolvedTokens, SharedToken, TokenStore};
use crate::DEFAULT_REALM;

/// Replaces the scope check once a token is resolved.
pub type Authorizer = Arc<dyn Fn(Exchange, &[String], &SharedToken) -> Outcome + Send + Sync>;

/// Bearer token authentication.
///
/// ```rust
/// use std::sync::Arc;
/// use sluice_pipeline::Endpoint;
/// use sluice_security::{Bearer, StaticTokenStore};
///
/// let bearer = Arc::new(Bearer::new(StaticTokenStore::new().with_token("admintoken", ["write"])));
///
/// let endpoint = Endpoint::post("/posts")
///     .security(bearer, ["write"])
///     .build()
///     .unwrap();
/// # let _ = endpoint;
/// ```
pub struct Bearer {
    name: String,
    realm: String,
    store: Arc<dyn TokenStore>,
    authorizer: Option<Authorizer>,
    headers: Schema,
}

impl Bearer {
    /// Named `bearer`, resolving tokens with `store`.
    pub fn new(store: impl TokenStore) -> Self {
        Self {
            name: "bearer".to_string(),
            realm: DEFAULT_REALM.to_string(),
            store: Arc::new(store),
            authorizer: None,
            headers: Schema::new().field(
                "authorization",
                Field::new(Type::string())
                    .optional()
                    .sensitive()
                    .at(Location::Header)
                    .describe("Bearer access token")
                    .example("Bearer <token>"),
            ),
        }
    }

    /// Sets the scheme name used to refer to it.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the realm announced in `WWW-Authenticate`.
    #[must_use]
    pub fn realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = realm.into();
        self
    }

    /// Decides access with `authorizer` instead of the scope check.
    #[must_use]
    pub fn authorizer<F>(mut self, authorizer: F) -> Self
    where
        F: Fn(Exchange, &[String], &SharedToken) -> Outcome + Send + Sync + 'static,
    {
        self.authorizer = Some(Arc::new(authorizer));
        self
    }

    fn resolve(&self, exchange: Exchange) -> Result<(Exchange, SharedToken), Outcome> {
        let resolved = exchange.extensions().get::<ResolvedTokens>();
        if let Some(token) = resolved.and_then(|r| r.get(&self.name)) {
            tracing::trace!(scheme = %self.name, "reusing resolved token");
            let token = Arc::clone(token);
            return Ok((exchange, token));
        }

        let Some(raw) = credentials(&exchange, "Bearer") else {
            tracing::debug!(scheme = %self.name, "missing bearer credentials");
            return Err(unauthorized(
                exchange,
                "Bearer",
                &self.realm,
                None,
                "Missing bearer token",
            ));
        };

        let Some(token) = self.store.find(raw) else {
            tracing::debug!(scheme = %self.name, "unknown bearer token");
            return Err(unauthorized(
                exchange,
                "Bearer",
                &self.realm,
                Some("invalid_token"),
                "Invalid access token",
            ));
        };

        let resolved = exchange
            .extensions()
            .get::<ResolvedTokens>()
            .cloned()
            .unwrap_or_default()
            .with(&self.name, Arc::clone(&token));
        Ok((exchange.with_extension(resolved), token))
    }
}

impl SecurityScheme for Bearer {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, exchange: Exchange, scopes: &[String]) -> Outcome {
        let (exchange, token) = match self.resolve(exchange) {
            Ok(resolved) => resolved,
            Err(outcome) => return outcome,
        };

        if let Some(authorizer) = &self.authorizer {
            return authorizer(exchange, scopes, &token);
        }

        if token.allows(&exchange, scopes) {
            exchange.proceed()
        } else {
            tracing::debug!(scheme = %self.name, required = ?scopes, "insufficient scope");
            forbidden(exchange, "Insufficient scope")
        }
    }

    fn documentation(&self) -> Value {
        json!({"type": "http", "scheme": "bearer"})
    }

    fn header_schema(&self) -> Option<&Schema> {
        Some(&self.headers)
    }
}

impl fmt::Debug for Bearer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bearer")
            .field("name", &self.name)
            .field("realm", &self.realm)
            .field("authorizer", &self.authorizer.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::{ScopedToken, StaticTokenStore};
    use http::{Method, StatusCode, Uri};
    use sluice_core::Request;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn exchange(authorization: Option<&str>) -> Exchange {
        let request = Request::new(Method::GET, Uri::from_static("/posts"));
        let request = match authorization {
            Some(value) => request.with_header("authorization", value),
            None => request,
        };
        Exchange::new(request)
    }

    fn scopes(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    fn bearer() -> Bearer {
        Bearer::new(StaticTokenStore::new().with_token("admintoken", ["write"])).realm("posts")
    }

    #[test]
    fn test_missing_header_is_401_with_challenge() {
        let outcome = bearer().handle(exchange(None), &scopes(&["write"]));
        assert!(outcome.is_halted());

        let ex = outcome.into_exchange();
        assert_eq!(ex.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ex.response().header("www-authenticate"),
            Some("Bearer realm=\"posts\"")
        );
    }

    #[test]
    fn test_wrong_scheme_is_401() {
        let outcome = bearer().handle(exchange(Some("Basic YTpi")), &[]);
        assert_eq!(outcome.exchange().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_unknown_token_is_401_invalid_token() {
        let outcome = bearer().handle(exchange(Some("Bearer nope")), &[]);
        let ex = outcome.into_exchange();
        assert_eq!(ex.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ex.response().header("www-authenticate"),
            Some("Bearer realm=\"posts\", error=\"invalid_token\"")
        );
    }

    #[test]
    fn test_insufficient_scope_is_403() {
        let outcome = bearer().handle(exchange(Some("Bearer admintoken")), &scopes(&["admin"]));
        assert!(outcome.is_halted());
        assert_eq!(outcome.exchange().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_sufficient_scope_continues() {
        let outcome = bearer().handle(exchange(Some("Bearer admintoken")), &scopes(&["write"]));
        assert!(!outcome.is_halted());
        assert_eq!(outcome.exchange().status(), StatusCode::OK);

        let resolved = outcome.exchange().extensions().get::<ResolvedTokens>().unwrap();
        assert!(resolved.get("bearer").is_some());
    }

    #[test]
    fn test_second_check_reuses_token() {
        let lookups = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&lookups);
        let store = move |raw: &str| -> Option<SharedToken> {
            counter.fetch_add(1, Ordering::SeqCst);
            (raw == "admintoken")
                .then(|| Arc::new(ScopedToken::new(["read", "write"])) as SharedToken)
        };
        let scheme = Bearer::new(store);

        let first = scheme.handle(exchange(Some("Bearer admintoken")), &scopes(&["read"]));
        assert!(!first.is_halted());
        let second = scheme.handle(first.into_exchange(), &scopes(&["admin"]));

        assert_eq!(lookups.load(Ordering::SeqCst), 1);
        assert_eq!(second.exchange().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_authorizer_bypasses_scope_check() {
        let scheme = bearer().authorizer(|ex: Exchange, _: &[String], token: &SharedToken| {
            ex.with_param("scopes", token.scopes().len()).proceed()
        });

        let outcome = scheme.handle(exchange(Some("Bearer admintoken")), &scopes(&["admin"]));
        assert!(!outcome.is_halted());
        assert_eq!(outcome.exchange().param("scopes"), Some(&serde_json::json!(1)));
    }

    #[test]
    fn test_authorizer_not_called_without_token() {
        let scheme =
            bearer().authorizer(|ex: Exchange, _: &[String], _: &SharedToken| ex.proceed());
        let outcome = scheme.handle(exchange(None), &[]);
        assert_eq!(outcome.exchange().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_named_schemes_keep_separate_tokens() {
        let a = bearer().named("a");
        let b = Bearer::new(StaticTokenStore::new()).named("b");

        let outcome = a.handle(exchange(Some("Bearer admintoken")), &[]);
        let outcome = b.handle(outcome.into_exchange(), &[]);
        assert_eq!(outcome.exchange().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_documentation_and_headers() {
        let scheme = bearer();
        assert_eq!(scheme.documentation(), json!({"type": "http", "scheme": "bearer"}));

        let headers = scheme.header_schema().unwrap();
        let field = headers.get("authorization").unwrap();
        assert!(!field.is_required());
        assert!(field.is_sensitive());
        assert_eq!(field.location(), Some(Location::Header));
    }
}
