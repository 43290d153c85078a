//! Access tokens and the stores that resolve them.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use sluice_core::Exchange;

/// A resolved bearer credential.
pub trait AccessToken: Send + Sync + 'static {
    /// Scopes granted to the token.
    fn scopes(&self) -> &[String];

    /// Who the token belongs to, if known.
    fn subject(&self) -> Option<&str> {
        None
    }

    /// True when the token grants every scope in `required`.
    fn allows(&self, _exchange: &Exchange, required: &[String]) -> bool {
        let granted = self.scopes();
        required.iter().all(|scope| granted.contains(scope))
    }
}

/// A shared access token.
pub type SharedToken = Arc<dyn AccessToken>;

/// A token with a fixed scope list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopedToken {
    subject: Option<String>,
    scopes: Vec<String>,
}

impl ScopedToken {
    /// Creates a token granting `scopes`.
    pub fn new<I, S>(scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            subject: None,
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    /// Sets the subject.
    #[must_use]
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }
}

impl AccessToken for ScopedToken {
    fn scopes(&self) -> &[String] {
        &self.scopes
    }

    fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }
}

/// Looks up tokens presented in `Authorization: Bearer <token>`.
pub trait TokenStore: Send + Sync + 'static {
    /// Returns the token for `raw`, or `None` when unknown.
    fn find(&self, raw: &str) -> Option<SharedToken>;
}

impl<F> TokenStore for F
where
    F: Fn(&str) -> Option<SharedToken> + Send + Sync + 'static,
{
    fn find(&self, raw: &str) -> Option<SharedToken> {
        self(raw)
    }
}

/// An in-memory token table.
///
/// ```rust
/// use sluice_security::{StaticTokenStore, TokenStore};
///
/// let store = StaticTokenStore::new().with_token("admintoken", ["write"]);
/// assert_eq!(store.find("admintoken").unwrap().scopes(), ["write"]);
/// assert!(store.find("other").is_none());
/// ```
#[derive(Clone, Default)]
pub struct StaticTokenStore {
    tokens: HashMap<String, SharedToken>,
}

impl StaticTokenStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a [`ScopedToken`] under `raw`.
    #[must_use]
    pub fn with_token<I, S>(self, raw: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_access_token(raw, ScopedToken::new(scopes))
    }

    /// Adds any [`AccessToken`] under `raw`.
    #[must_use]
    pub fn with_access_token(mut self, raw: impl Into<String>, token: impl AccessToken) -> Self {
        self.tokens.insert(raw.into(), Arc::new(token));
        self
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when the store holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl TokenStore for StaticTokenStore {
    fn find(&self, raw: &str) -> Option<SharedToken> {
        self.tokens.get(raw).cloned()
    }
}

impl fmt::Debug for StaticTokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // never print raw tokens
        f.debug_struct("StaticTokenStore")
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

/// Tokens already resolved during this request, keyed by scheme name.
///
/// Stored as an exchange extension so repeated checks by the same scheme
/// reuse the token instead of querying the store again.
#[derive(Clone, Default)]
pub struct ResolvedTokens {
    tokens: HashMap<String, SharedToken>,
}

impl ResolvedTokens {
    /// The token resolved by `scheme`.
    #[must_use]
    pub fn get(&self, scheme: &str) -> Option<&SharedToken> {
        self.tokens.get(scheme)
    }

    pub(crate) fn with(mut self, scheme: &str, token: SharedToken) -> Self {
        self.tokens.insert(scheme.to_string(), token);
        self
    }
}

impl fmt::Debug for ResolvedTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.tokens.keys()).finish()
    }
}
