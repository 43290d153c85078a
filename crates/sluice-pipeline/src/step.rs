//! The step contract.
//!
//! A [`Step`] takes an [`Exchange`] and hands back an [`Outcome`]. Besides
//! `call`, a step may expose schema fragments; the owning pipeline reads them
//! once, at registration, to build the combined schema of an endpoint.

use std::fmt;
use std::sync::Arc;

use sluice_core::schema::Schema;
use sluice_core::{ContentType, Exchange, Outcome};

/// A unit of request processing.
///
/// # Example
///
/// ```rust
/// use sluice_core::{Exchange, Outcome};
/// use sluice_pipeline::Step;
///
/// struct Greet;
///
/// impl Step for Greet {
///     fn name(&self) -> &str {
///         "greet"
///     }
///
///     fn call(&self, exchange: Exchange) -> Outcome {
///         exchange.with_param("greeting", "hello").proceed()
///     }
/// }
/// ```
pub trait Step: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Runs the step.
    fn call(&self, exchange: Exchange) -> Outcome;

    /// Query and path fields this step contributes.
    fn query_schema(&self) -> Option<&Schema> {
        None
    }

    /// Body fields this step contributes, with the content type they apply to.
    fn payload_schema(&self) -> Option<(&ContentType, &Schema)> {
        None
    }

    /// Header fields this step contributes.
    fn header_schema(&self) -> Option<&Schema> {
        None
    }
}

/// A shared, type-erased step.
pub type BoxedStep = Arc<dyn Step>;

impl<S: Step + ?Sized> Step for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn call(&self, exchange: Exchange) -> Outcome {
        (**self).call(exchange)
    }

    fn query_schema(&self) -> Option<&Schema> {
        (**self).query_schema()
    }

    fn payload_schema(&self) -> Option<(&ContentType, &Schema)> {
        (**self).payload_schema()
    }

    fn header_schema(&self) -> Option<&Schema> {
        (**self).header_schema()
    }
}

/// A step backed by a closure.
pub struct FnStep<F> {
    name: String,
    f: F,
}

impl<F> FnStep<F>
where
    F: Fn(Exchange) -> Outcome + Send + Sync + 'static,
{
    /// Wraps `f` under `name`.
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> Step for FnStep<F>
where
    F: Fn(Exchange) -> Outcome + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn call(&self, exchange: Exchange) -> Outcome {
        (self.f)(exchange)
    }
}

impl<F> fmt::Debug for FnStep<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStep").field("name", &self.name).finish()
    }
}
