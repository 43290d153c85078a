//! Responders: one status range × content type, ending in a serializer.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::StatusCode;
use serde_json::{json, Value};
use sluice_core::{ConfigurationError, ContentType, Exchange, Outcome, StatusRange};

use crate::docs::ResponderDoc;
use crate::pipeline::{Pipeline, PipelineBuilder};
use crate::serializer::{InlineFn, InlineSerializers, RenderError, Serializer};
use crate::step::Step;

/// Formats an exchange for one status range and content type.
///
/// Built with [`Responder::builder`] and frozen by
/// [`ResponderBuilder::build`].
///
/// ```rust
/// use serde_json::json;
/// use sluice_core::{ContentType, Exchange};
/// use sluice_pipeline::Responder;
///
/// let responder = Responder::builder(200..=299)
///     .accepts("html")
///     .render(|ex: &Exchange| json!(format!("<p>{}</p>", ex.status())))
///     .build()
///     .unwrap();
///
/// assert_eq!(responder.content_type(), &ContentType::html());
/// ```
pub struct Responder {
    statuses: StatusRange,
    accepts: ContentType,
    content_type: ContentType,
    description: Option<String>,
    pipeline: Pipeline,
    serializer: Option<Arc<dyn Serializer>>,
}

impl Responder {
    /// Starts a responder for `statuses` (a status or an inclusive range).
    pub fn builder<R>(statuses: R) -> ResponderBuilder
    where
        R: TryInto<StatusRange>,
        ConfigurationError: From<R::Error>,
    {
        ResponderBuilder::new(statuses)
    }

    /// Statuses this responder handles.
    #[must_use]
    pub fn statuses(&self) -> StatusRange {
        self.statuses
    }

    /// Pattern matched against the request's Accept header.
    #[must_use]
    pub fn accepts(&self) -> &ContentType {
        &self.accepts
    }

    /// Content type written to the response.
    #[must_use]
    pub fn content_type(&self) -> &ContentType {
        &self.content_type
    }

    /// Human description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// True when a serializer is registered.
    #[must_use]
    pub fn has_serializer(&self) -> bool {
        self.serializer.is_some()
    }

    /// Runs the steps, then writes Content-Type and the serialized body.
    ///
    /// With no value the body is empty unless the serializer renders
    /// without one. A serializer failure becomes a 500.
    pub fn call(&self, exchange: Exchange) -> Outcome {
        let outcome = self.pipeline.call(exchange);
        let halted = outcome.is_halted();
        let mut exchange = outcome.into_exchange();

        exchange
            .response_mut()
            .set_content_type(&self.content_type);

        if let Some(serializer) = &self.serializer {
            if exchange.value().is_none() && !serializer.renders_without_value() {
                exchange.response_mut().set_body(Bytes::new());
            } else {
                match serializer.render(&exchange) {
                    Ok(body) => exchange.response_mut().set_body(body),
                    Err(e) => exchange = render_failure(exchange, &e),
                }
            }
        }

        if halted {
            exchange.halt()
        } else {
            exchange.proceed()
        }
    }

    /// Documentation entry.
    #[must_use]
    pub fn documentation(&self) -> ResponderDoc {
        ResponderDoc {
            statuses: self.statuses,
            content_type: self.content_type.clone(),
            description: self.description.clone(),
        }
    }
}

fn render_failure(exchange: Exchange, error: &RenderError) -> Exchange {
    tracing::error!(error = %error, "failed to render response");
    let mut exchange = exchange.with_status(StatusCode::INTERNAL_SERVER_ERROR);
    exchange
        .response_mut()
        .set_content_type(&ContentType::json());
    exchange
        .response_mut()
        .set_body(json!({ "message": "failed to render response" }).to_string());
    exchange
}

impl Step for Responder {
    fn name(&self) -> &str {
        "responder"
    }

    fn call(&self, exchange: Exchange) -> Outcome {
        Responder::call(self, exchange)
    }
}

impl PartialEq for Responder {
    fn eq(&self, other: &Self) -> bool {
        self.statuses == other.statuses && self.content_type == other.content_type
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("statuses", &self.statuses)
            .field("accepts", &self.accepts)
            .field("content_type", &self.content_type)
            .field("steps", &self.pipeline.step_names())
            .field("serializer", &self.serializer.is_some())
            .finish()
    }
}

/// Builder for [`Responder`].
///
/// Configuration errors are recorded and returned by
/// [`build`](ResponderBuilder::build); the first one wins.
pub struct ResponderBuilder {
    statuses: StatusRange,
    accepts: ContentType,
    content_type: Option<ContentType>,
    description: Option<String>,
    pipeline: PipelineBuilder,
    serializer: Option<Arc<dyn Serializer>>,
    inline: Option<InlineFn>,
    inline_serializers: Arc<InlineSerializers>,
    error: Option<ConfigurationError>,
}

impl ResponderBuilder {
    fn new<R>(statuses: R) -> Self
    where
        R: TryInto<StatusRange>,
        ConfigurationError: From<R::Error>,
    {
        let mut builder = Self {
            statuses: StatusRange::single(StatusCode::OK.as_u16()),
            accepts: ContentType::json(),
            content_type: None,
            description: None,
            pipeline: PipelineBuilder::new(),
            serializer: None,
            inline: None,
            inline_serializers: Arc::new(InlineSerializers::default()),
            error: None,
        };
        match statuses.try_into() {
            Ok(range) => builder.statuses = range,
            Err(e) => builder.record(e.into()),
        }
        builder
    }

    fn record(&mut self, error: ConfigurationError) {
        self.error.get_or_insert(error);
    }

    fn parse<C>(&mut self, content_type: C) -> Option<ContentType>
    where
        C: TryInto<ContentType>,
        ConfigurationError: From<C::Error>,
    {
        match content_type.try_into() {
            Ok(ct) => Some(ct),
            Err(e) => {
                self.record(e.into());
                None
            }
        }
    }

    /// Sets the Accept pattern (default `application/json`).
    #[must_use]
    pub fn accepts<C>(mut self, content_type: C) -> Self
    where
        C: TryInto<ContentType>,
        ConfigurationError: From<C::Error>,
    {
        if let Some(ct) = self.parse(content_type) {
            self.accepts = ct;
        }
        self
    }

    /// Sets the response Content-Type (defaults to the Accept pattern).
    #[must_use]
    pub fn content_type<C>(mut self, content_type: C) -> Self
    where
        C: TryInto<ContentType>,
        ConfigurationError: From<C::Error>,
    {
        if let Some(ct) = self.parse(content_type) {
            self.content_type = Some(ct);
        }
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a step that runs before serialization.
    #[must_use]
    pub fn step<S: Step>(mut self, step: S) -> Self {
        self.pipeline = self.pipeline.step(step);
        self
    }

    /// Sets the serializer. A responder takes exactly one.
    #[must_use]
    pub fn serialize<S: Serializer>(mut self, serializer: S) -> Self {
        if self.serializer.is_some() || self.inline.is_some() {
            self.duplicate_serializer();
        } else {
            self.serializer = Some(Arc::new(serializer));
        }
        self
    }

    /// Sets an inline closure as serializer, built for the content type's
    /// subtype from the inline serializer table.
    #[must_use]
    pub fn render<F>(mut self, f: F) -> Self
    where
        F: Fn(&Exchange) -> Value + Send + Sync + 'static,
    {
        if self.serializer.is_some() || self.inline.is_some() {
            self.duplicate_serializer();
        } else {
            self.inline = Some(Arc::new(f));
        }
        self
    }

    /// Replaces the inline serializer table.
    #[must_use]
    pub fn inline_serializers(mut self, table: Arc<InlineSerializers>) -> Self {
        self.inline_serializers = table;
        self
    }

    fn duplicate_serializer(&mut self) {
        let content_type = self.content_type.as_ref().unwrap_or(&self.accepts);
        let error = ConfigurationError::DuplicateSerializer {
            content_type: content_type.to_string(),
        };
        self.record(error);
    }

    /// Freezes the responder.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error recorded while building.
    pub fn build(self) -> Result<Responder, ConfigurationError> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let content_type = self.content_type.unwrap_or_else(|| self.accepts.clone());
        let serializer = match self.inline {
            Some(f) => Some(self.inline_serializers.build(&content_type, f)?),
            None => self.serializer,
        };

        Ok(Responder {
            statuses: self.statuses,
            accepts: self.accepts,
            content_type,
            description: self.description,
            pipeline: self.pipeline.build(),
            serializer,
        })
    }
}

impl fmt::Debug for ResponderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponderBuilder")
            .field("statuses", &self.statuses)
            .field("accepts", &self.accepts)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}
