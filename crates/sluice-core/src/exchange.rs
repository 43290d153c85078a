//! The state threaded through every pipeline.
//!
//! An [`Exchange`] holds the business value, validated params, field errors,
//! the shared request and the response being built. Steps take it by value
//! and hand back an [`Outcome`]: `Continue` to run the next step or `Halt`
//! to stop the pipeline.
//!
//! ```
//! use sluice_core::{Exchange, Outcome, Request};
//! use http::{Method, StatusCode, Uri};
//!
//! let exchange = Exchange::new(Request::new(Method::GET, Uri::from_static("/")));
//! let outcome = exchange
//!     .with_error("name", "Is required")
//!     .with_status(StatusCode::UNPROCESSABLE_ENTITY)
//!     .halt();
//!
//! assert!(outcome.is_halted());
//! assert_eq!(outcome.exchange().errors()["name"], "Is required");
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::header::HeaderName;
use http::StatusCode;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ErrorCategory, ErrorMap};
use crate::request::Request;
use crate::response::Response;

/// Validated parameter name → coerced value.
pub type ParamMap = IndexMap<String, Value>;

/// The business value carried by an exchange, opaque to the framework.
///
/// Serializers downcast it back to the concrete type they expect. A payload
/// built with [`Payload::serialized`] also keeps a JSON view for template
/// renderers that cannot name the concrete type.
#[derive(Clone)]
pub struct Payload {
    inner: Arc<dyn Any + Send + Sync>,
    json: Option<Value>,
    type_name: &'static str,
}

impl Payload {
    /// Wraps any value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            inner: Arc::new(value),
            json: None,
            type_name: std::any::type_name::<T>(),
        }
    }

    /// Wraps a value and records its JSON form.
    pub fn serialized<T: Serialize + Any + Send + Sync>(value: T) -> Self {
        let json = match serde_json::to_value(&value) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    type_name = std::any::type_name::<T>(),
                    "payload has no JSON view"
                );
                None
            }
        };
        Self {
            json,
            ..Self::new(value)
        }
    }

    /// Borrows the value as `T`, if that is what it holds.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// JSON view, when one was recorded.
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        self.json.as_ref()
    }

    /// Name of the wrapped type, for diagnostics.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Self {
            json: Some(value.clone()),
            ..Self::new(value)
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Payload")
            .field("type_name", &self.type_name)
            .field("json", &self.json)
            .finish()
    }
}

/// Type-keyed values that steps share within one request.
#[derive(Clone, Default)]
pub struct Extensions {
    map: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Extensions {
    /// Stores `value`, replacing any previous value of the same type.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.map.insert(TypeId::of::<T>(), Arc::new(value));
    }

    /// Borrows the stored value of type `T`.
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.map
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    /// True when a value of type `T` is stored.
    #[must_use]
    pub fn contains<T: Any + Send + Sync>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extensions")
            .field("len", &self.map.len())
            .finish()
    }
}

/// Per-request state threaded through a pipeline.
#[derive(Debug, Clone)]
pub struct Exchange {
    value: Option<Payload>,
    params: ParamMap,
    errors: ErrorMap,
    request: Arc<Request>,
    response: Response,
    extensions: Extensions,
}

impl Exchange {
    /// Starts an exchange: no value, no params, a 200 response with no body.
    #[must_use]
    pub fn new(request: impl Into<Arc<Request>>) -> Self {
        Self {
            value: None,
            params: ParamMap::new(),
            errors: ErrorMap::new(),
            request: request.into(),
            response: Response::new(),
            extensions: Extensions::default(),
        }
    }

    /// Current business value.
    #[must_use]
    pub fn value(&self) -> Option<&Payload> {
        self.value.as_ref()
    }

    /// Validated params accumulated so far.
    #[must_use]
    pub fn params(&self) -> &ParamMap {
        &self.params
    }

    /// One validated param.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Field errors; empty while the exchange is valid.
    #[must_use]
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// True when no field errors were recorded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// The shared inbound request.
    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// The response being built.
    #[must_use]
    pub fn response(&self) -> &Response {
        &self.response
    }

    /// Mutable access to the response being built.
    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    /// Current response status.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    /// Takes the response, dropping the rest of the exchange.
    #[must_use]
    pub fn into_response(self) -> Response {
        self.response
    }

    /// Values shared between steps.
    #[must_use]
    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Replaces the business value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Payload>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Clears the business value.
    #[must_use]
    pub fn without_value(mut self) -> Self {
        self.value = None;
        self
    }

    /// Merges params, later keys replacing earlier ones.
    #[must_use]
    pub fn with_params(mut self, params: impl IntoIterator<Item = (String, Value)>) -> Self {
        self.params.extend(params);
        self
    }

    /// Sets one param.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Merges field errors.
    #[must_use]
    pub fn with_errors(mut self, errors: impl IntoIterator<Item = (String, String)>) -> Self {
        self.errors.extend(errors);
        self
    }

    /// Records one field error.
    #[must_use]
    pub fn with_error(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.errors.insert(field.into(), message.into());
        self
    }

    /// Sets the response status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.response.set_status(status);
        self
    }

    /// Sets a response header.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: &str) -> Self {
        self.response.set_header(name, value);
        self
    }

    /// Sets the response body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.response.set_body(body);
        self
    }

    /// Stores a value for later steps in this request.
    #[must_use]
    pub fn with_extension<T: Any + Send + Sync>(mut self, value: T) -> Self {
        self.extensions.insert(value);
        self
    }

    /// Continues the pipeline with this exchange.
    pub fn proceed(self) -> Outcome {
        Outcome::Continue(self)
    }

    /// Stops the pipeline with this exchange.
    pub fn halt(self) -> Outcome {
        Outcome::Halt(self)
    }

    /// Records errors under `category`, sets its status and halts.
    pub fn fail(
        self,
        category: ErrorCategory,
        errors: impl IntoIterator<Item = (String, String)>,
    ) -> Outcome {
        self.with_errors(errors)
            .with_status(category.default_status_code())
            .halt()
    }
}

/// What a step hands back: keep going, or stop here.
#[derive(Debug, Clone)]
#[must_use]
pub enum Outcome {
    /// Run the next step.
    Continue(Exchange),
    /// Skip the remaining steps; the exchange is still inspectable.
    Halt(Exchange),
}

impl Outcome {
    /// True for [`Outcome::Halt`].
    #[must_use]
    pub fn is_halted(&self) -> bool {
        matches!(self, Self::Halt(_))
    }

    /// Borrows the exchange regardless of variant.
    #[must_use]
    pub fn exchange(&self) -> &Exchange {
        match self {
            Self::Continue(exchange) | Self::Halt(exchange) => exchange,
        }
    }

    /// Takes the exchange regardless of variant.
    #[must_use]
    pub fn into_exchange(self) -> Exchange {
        match self {
            Self::Continue(exchange) | Self::Halt(exchange) => exchange,
        }
    }

    /// Forces the outcome back to `Continue`.
    pub fn resume(self) -> Self {
        Self::Continue(self.into_exchange())
    }
}
