//! `Authorization: Basic` username and password.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use sluice_core::schema::{Field, Location, Schema, Type};
use sluice_core::{Exchange, Outcome};
use sluice_pipeline::SecurityScheme;

use crate::challenge::{credentials, forbidden, unauthorized};
use crate::DEFAULT_REALM;

/// Checks a username and password pair.
pub trait CredentialStore: Send + Sync + 'static {
    /// True when `password` is correct for `username`.
    fn verify(&self, username: &str, password: &str) -> bool;
}

impl<F> CredentialStore for F
where
    F: Fn(&str, &str) -> bool + Send + Sync + 'static,
{
    fn verify(&self, username: &str, password: &str) -> bool {
        self(username, password)
    }
}

/// An in-memory username → password table.
#[derive(Clone, Default)]
pub struct StaticCredentials {
    users: HashMap<String, String>,
}

impl StaticCredentials {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user.
    #[must_use]
    pub fn with_user(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.users.insert(username.into(), password.into());
        self
    }
}

impl CredentialStore for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        self.users.get(username).is_some_and(|p| p == password)
    }
}

impl fmt::Debug for StaticCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.users.keys()).finish()
    }
}

/// HTTP Basic authentication.
///
/// Missing credentials (or another scheme) are a 401 challenge. Credentials
/// that fail to decode or do not match the store are a 403. Scopes are
/// ignored.
///
/// ```rust
/// use sluice_security::{Basic, StaticCredentials};
///
/// let basic = Basic::new(StaticCredentials::new().with_user("ada", "lovelace"));
/// ```
pub struct Basic {
    name: String,
    realm: String,
    store: Arc<dyn CredentialStore>,
    headers: Schema,
}

impl Basic {
    /// Named `basic`, verifying against `store`.
    pub fn new(store: impl CredentialStore) -> Self {
        Self {
            name: "basic".to_string(),
            realm: DEFAULT_REALM.to_string(),
            store: Arc::new(store),
            headers: Schema::new().field(
                "authorization",
                Field::new(Type::string())
                    .optional()
                    .sensitive()
                    .at(Location::Header)
                    .describe("Basic credentials"),
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
}

/// Splits `base64(username:password)`; `None` when either step fails.
fn decode(encoded: &str) -> Option<(String, String)> {
    let bytes = general_purpose::STANDARD.decode(encoded).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    let (username, password) = text.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

impl SecurityScheme for Basic {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle(&self, exchange: Exchange, _scopes: &[String]) -> Outcome {
        let Some(encoded) = credentials(&exchange, "Basic") else {
            tracing::debug!(scheme = %self.name, "missing basic credentials");
            return unauthorized(exchange, "Basic", &self.realm, None, "Missing credentials");
        };

        match decode(encoded) {
            Some((username, password)) if self.store.verify(&username, &password) => {
                exchange.proceed()
            }
            _ => {
                tracing::debug!(scheme = %self.name, "basic credentials rejected");
                forbidden(exchange, "Invalid credentials")
            }
        }
    }

    fn documentation(&self) -> Value {
        json!({"type": "http", "scheme": "basic"})
    }

    fn header_schema(&self) -> Option<&Schema> {
        Some(&self.headers)
    }
}

impl fmt::Debug for Basic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Basic")
            .field("name", &self.name)
            .field("realm", &self.realm)
            .finish_non_exhaustive()
    }
}
