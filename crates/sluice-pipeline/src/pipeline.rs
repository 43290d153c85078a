//! The ordered step-execution engine shared by endpoints and responders.
//!
//! Steps run in registration order. The first step that halts stops the
//! pipeline and its exchange is returned as is:
//!
//! ```text
//! exchange → [step 1] → Continue → [step 2] → Halt ──────────→ Halt(exchange)
//!                                              [step 3] never runs
//! ```
//!
//! Registration also accumulates the schema fragments steps expose. Query
//! fields whose name is a path token are located at `path`, the rest at
//! `query`. Payload fragments are kept per content type and merged. Header
//! fragments merge into one header schema.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use sluice_core::schema::{Location, Schema};
use sluice_core::{ContentType, Exchange, Outcome};

use crate::step::{BoxedStep, Step};

/// Schemas accumulated from a pipeline's steps.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    query: Schema,
    payloads: IndexMap<String, (ContentType, Schema)>,
    header: Schema,
}

impl SchemaSet {
    /// Path and query fields.
    #[must_use]
    pub fn query(&self) -> &Schema {
        &self.query
    }

    /// Body fields for one content type, looked up by `type/subtype`.
    #[must_use]
    pub fn payload(&self, content_type: &ContentType) -> Option<&Schema> {
        self.payloads
            .get(&content_type.essence())
            .map(|(_, schema)| schema)
    }

    /// Every payload schema with its content type, in registration order.
    pub fn payloads(&self) -> impl Iterator<Item = (&ContentType, &Schema)> {
        self.payloads.values().map(|(ct, schema)| (ct, schema))
    }

    /// Header fields.
    #[must_use]
    pub fn header(&self) -> &Schema {
        &self.header
    }

    fn absorb(&mut self, step: &dyn Step, path_tokens: &[String]) {
        if let Some(fragment) = step.query_schema() {
            let located = fragment.clone().located_by(|name| {
                if path_tokens.iter().any(|t| t == name) {
                    Location::Path
                } else {
                    Location::Query
                }
            });
            self.query.merge(located);
        }

        if let Some((content_type, fragment)) = step.payload_schema() {
            let located = fragment.clone().located(Location::Body);
            match self.payloads.get_mut(&content_type.essence()) {
                Some((_, existing)) => existing.merge(located),
                None => {
                    self.payloads
                        .insert(content_type.essence(), (content_type.clone(), located));
                }
            }
        }

        if let Some(fragment) = step.header_schema() {
            self.header.merge(fragment.clone().located(Location::Header));
        }
    }
}

/// A frozen sequence of steps.
///
/// # Example
///
/// ```rust
/// use http::{Method, Uri};
/// use sluice_core::{Exchange, Request};
/// use sluice_pipeline::{FnStep, Pipeline};
///
/// let pipeline = Pipeline::builder()
///     .step(FnStep::new("load", |ex: Exchange| ex.with_param("id", 1).proceed()))
///     .step(FnStep::new("stop", |ex: Exchange| ex.halt()))
///     .build();
///
/// let outcome = pipeline.call(Exchange::new(Request::new(Method::GET, Uri::from_static("/"))));
/// assert!(outcome.is_halted());
/// ```
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<BoxedStep>,
    schemas: SchemaSet,
}

impl Pipeline {
    /// Creates a pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Folds the steps over `exchange`, stopping at the first halt.
    pub fn call(&self, exchange: Exchange) -> Outcome {
        let mut exchange = exchange;

        for step in &self.steps {
            tracing::trace!(step = step.name(), "running step");
            match step.call(exchange) {
                Outcome::Continue(next) => exchange = next,
                halted @ Outcome::Halt(_) => {
                    tracing::debug!(
                        step = step.name(),
                        status = halted.exchange().status().as_u16(),
                        "pipeline halted"
                    );
                    return halted;
                }
            }
        }

        exchange.proceed()
    }

    /// Accumulated schemas.
    #[must_use]
    pub fn schemas(&self) -> &SchemaSet {
        &self.schemas
    }

    /// Step names in execution order.
    #[must_use]
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True when the pipeline has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.step_names())
            .field("schemas", &self.schemas)
            .finish()
    }
}

/// A pipeline nests as a single step of another pipeline.
///
/// Its accumulated schemas become the outer fragments. A step carries one
/// payload fragment, so only the first payload content type is exposed.
impl Step for Pipeline {
    fn name(&self) -> &str {
        "pipeline"
    }

    fn call(&self, exchange: Exchange) -> Outcome {
        Pipeline::call(self, exchange)
    }

    fn query_schema(&self) -> Option<&Schema> {
        Some(self.schemas.query()).filter(|schema| !schema.is_empty())
    }

    fn payload_schema(&self) -> Option<(&ContentType, &Schema)> {
        self.schemas.payloads().next()
    }

    fn header_schema(&self) -> Option<&Schema> {
        Some(self.schemas.header()).filter(|schema| !schema.is_empty())
    }
}

/// Builder for [`Pipeline`]; consumed by [`PipelineBuilder::build`].
#[derive(Default)]
pub struct PipelineBuilder {
    steps: Vec<BoxedStep>,
    schemas: SchemaSet,
    path_tokens: Vec<String>,
}

impl PipelineBuilder {
    /// An empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Names that query fields are located at `path` for.
    #[must_use]
    pub fn path_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.path_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a step and absorbs its schema fragments.
    #[must_use]
    pub fn step<S: Step>(mut self, step: S) -> Self {
        self.push(Arc::new(step));
        self
    }

    /// Appends an already shared step.
    pub fn push(&mut self, step: BoxedStep) {
        self.schemas.absorb(step.as_ref(), &self.path_tokens);
        self.steps.push(step);
    }

    /// Schemas accumulated so far.
    #[must_use]
    pub fn schemas(&self) -> &SchemaSet {
        &self.schemas
    }

    /// Freezes the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            steps: self.steps,
            schemas: self.schemas,
        }
    }
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("steps", &self.steps.len())
            .field("path_tokens", &self.path_tokens)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::FnStep;
    use http::{Method, StatusCode, Uri};
    use serde_json::json;
    use sluice_core::schema::Type;
    use sluice_core::Request;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn exchange() -> Exchange {
        Exchange::new(Request::new(Method::GET, Uri::from_static("/")))
    }

    struct QueryFragment(Schema);

    impl Step for QueryFragment {
        fn name(&self) -> &str {
            "query-fragment"
        }

        fn call(&self, exchange: Exchange) -> Outcome {
            exchange.proceed()
        }

        fn query_schema(&self) -> Option<&Schema> {
            Some(&self.0)
        }
    }

    struct PayloadFragment(ContentType, Schema);

    impl Step for PayloadFragment {
        fn name(&self) -> &str {
            "payload-fragment"
        }

        fn call(&self, exchange: Exchange) -> Outcome {
            exchange.proceed()
        }

        fn payload_schema(&self) -> Option<(&ContentType, &Schema)> {
            Some((&self.0, &self.1))
        }
    }

    #[test]
    fn test_empty_pipeline_returns_input() {
        let outcome = Pipeline::default().call(exchange().with_param("a", 1));
        assert!(!outcome.is_halted());
        assert_eq!(outcome.exchange().param("a"), Some(&json!(1)));
    }

    #[test]
    fn test_halt_skips_remaining_steps() {
        let third = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&third);

        let pipeline = Pipeline::builder()
            .step(FnStep::new("one", |ex: Exchange| ex.with_param("one", true).proceed()))
            .step(FnStep::new("two", |ex: Exchange| {
                ex.with_status(StatusCode::CONFLICT).with_param("two", true).halt()
            }))
            .step(FnStep::new("three", move |ex: Exchange| {
                counter.fetch_add(1, Ordering::SeqCst);
                ex.proceed()
            }))
            .build();

        let outcome = pipeline.call(exchange());
        assert!(outcome.is_halted());
        assert_eq!(third.load(Ordering::SeqCst), 0);

        let exchange = outcome.into_exchange();
        assert_eq!(exchange.status(), StatusCode::CONFLICT);
        assert_eq!(exchange.param("one"), Some(&json!(true)));
        assert_eq!(exchange.param("two"), Some(&json!(true)));
    }

    #[test]
    fn test_query_fields_located_by_path_tokens() {
        let pipeline = Pipeline::builder()
            .path_tokens(["id"])
            .step(QueryFragment(
                Schema::new()
                    .field("id", Type::lax_integer())
                    .field("page", Type::lax_integer().optional()),
            ))
            .build();

        let query = pipeline.schemas().query();
        assert_eq!(query.get("id").unwrap().location(), Some(Location::Path));
        assert_eq!(query.get("page").unwrap().location(), Some(Location::Query));
    }

    #[test]
    fn test_payload_fragments_merge_per_content_type() {
        let pipeline = Pipeline::builder()
            .step(PayloadFragment(
                ContentType::json(),
                Schema::new().field("name", Type::string()),
            ))
            .step(PayloadFragment(
                ContentType::json(),
                Schema::new().field("age", Type::integer()),
            ))
            .step(PayloadFragment(
                ContentType::form(),
                Schema::new().field("token", Type::string()),
            ))
            .build();

        let json = pipeline.schemas().payload(&ContentType::json()).unwrap();
        assert_eq!(json.len(), 2);
        assert_eq!(json.get("age").unwrap().location(), Some(Location::Body));
        assert_eq!(pipeline.schemas().payloads().count(), 2);
    }

    #[test]
    fn test_step_names() {
        let pipeline = Pipeline::builder()
            .step(FnStep::new("a", Exchange::proceed))
            .step(FnStep::new("b", Exchange::proceed))
            .build();
        assert_eq!(pipeline.step_names(), vec!["a", "b"]);
        assert_eq!(pipeline.len(), 2);
    }

    #[test]
    fn test_nested_pipeline_is_a_step() {
        let inner = Pipeline::builder()
            .step(QueryFragment(Schema::new().field("id", Type::lax_integer())))
            .step(PayloadFragment(
                ContentType::json(),
                Schema::new().field("name", Type::string()),
            ))
            .step(PayloadFragment(
                ContentType::form(),
                Schema::new().field("token", Type::string()),
            ))
            .step(FnStep::new("deny", |ex: Exchange| {
                ex.with_status(StatusCode::FORBIDDEN).halt()
            }))
            .build();

        let after = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&after);
        let outer = Pipeline::builder()
            .path_tokens(["id"])
            .step(inner)
            .step(FnStep::new("after", move |ex: Exchange| {
                counter.fetch_add(1, Ordering::SeqCst);
                ex.proceed()
            }))
            .build();

        assert_eq!(outer.step_names(), vec!["pipeline", "after"]);
        let outcome = outer.call(exchange());
        assert!(outcome.is_halted());
        assert_eq!(outcome.exchange().status(), StatusCode::FORBIDDEN);
        assert_eq!(after.load(Ordering::SeqCst), 0);

        let query = outer.schemas().query();
        assert_eq!(query.get("id").unwrap().location(), Some(Location::Query));
        assert!(outer.schemas().payload(&ContentType::json()).is_some());
        assert!(outer.schemas().payload(&ContentType::form()).is_none());
        assert!(outer.schemas().header().is_empty());
    }
}
