//! Endpoints: verb + path, accumulated schemas, ordered steps and responders.
//!
//! Every declaration on [`EndpointBuilder`] (`query_schema`,
//! `payload_schema`, `header_schema`, `security`, `step`) registers a step,
//! so steps run in exactly the order they were declared. A path template
//! with captures registers an implicit query validation first, typing every
//! capture as a string located at `path`; a later `query_schema` may retype
//! a capture and it stays at `path`.
//!
//! After the steps, the endpoint resumes a halted exchange, resolves a
//! responder for the final status and the Accept header, and runs it.
//! Built-in JSON responders cover 204, 304, 2xx and 4xx; anything else
//! without a responder gets a JSON `{message}` body.

use std::sync::{Arc, OnceLock};

use http::Method;
use serde_json::json;
use sluice_core::schema::{Field, Location, Schema, Type};
use sluice_core::{
    ConfigurationError, ContentType, Exchange, Outcome, Request, StatusRange,
};
use sluice_router::{PathTemplate, RouteError};

use crate::docs::{EndpointDoc, SecurityDoc};
use crate::pipeline::{Pipeline, PipelineBuilder, SchemaSet};
use crate::registry::ResponderRegistry;
use crate::responder::{Responder, ResponderBuilder};
use crate::security::{SecuritySchemes, SecurityStep, SharedScheme};
use crate::serializer::{DefaultEntity, InlineSerializers};
use crate::stages::{HeaderValidation, PayloadValidation, QueryValidation, SchemaCell};
use crate::step::{FnStep, Step};

/// A runnable request-handling unit.
///
/// # Example
///
/// ```rust
/// use http::{Method, StatusCode, Uri};
/// use sluice_core::schema::{Schema, Type};
/// use sluice_core::Request;
/// use sluice_pipeline::Endpoint;
///
/// let endpoint = Endpoint::get("/users/:id")
///     .query_schema(Schema::new().field("id", Type::lax_integer().within(18..)))
///     .build()
///     .unwrap();
///
/// let exchange = endpoint.run(Request::new(Method::GET, Uri::from_static("/users/17")));
/// assert_eq!(exchange.status(), StatusCode::UNPROCESSABLE_ENTITY);
/// assert_eq!(exchange.errors()["id"], "Must be within 18..");
/// ```
#[derive(Debug)]
pub struct Endpoint {
    method: Method,
    template: PathTemplate,
    description: Option<String>,
    pipeline: Pipeline,
    registry: ResponderRegistry,
    security: Vec<SecurityStep>,
    default_accept: String,
}

impl Endpoint {
    /// Starts an endpoint for `method` and a path template such as `/users/:id`.
    pub fn builder(method: Method, path: &str) -> EndpointBuilder {
        EndpointBuilder::new(method, path)
    }

    /// `GET` endpoint builder.
    pub fn get(path: &str) -> EndpointBuilder {
        Self::builder(Method::GET, path)
    }

    /// `POST` endpoint builder.
    pub fn post(path: &str) -> EndpointBuilder {
        Self::builder(Method::POST, path)
    }

    /// `PUT` endpoint builder.
    pub fn put(path: &str) -> EndpointBuilder {
        Self::builder(Method::PUT, path)
    }

    /// `PATCH` endpoint builder.
    pub fn patch(path: &str) -> EndpointBuilder {
        Self::builder(Method::PATCH, path)
    }

    /// `DELETE` endpoint builder.
    pub fn delete(path: &str) -> EndpointBuilder {
        Self::builder(Method::DELETE, path)
    }

    /// HTTP verb.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path template.
    #[must_use]
    pub fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// Human description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Accumulated query, payload and header schemas.
    #[must_use]
    pub fn schemas(&self) -> &SchemaSet {
        self.pipeline.schemas()
    }

    /// The step pipeline.
    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Responders, built-in ones last.
    #[must_use]
    pub fn registry(&self) -> &ResponderRegistry {
        &self.registry
    }

    /// Runs a fresh exchange for `request` through [`Endpoint::call`].
    ///
    /// When the request carries no path parameters they are captured from
    /// its path with this endpoint's template.
    pub fn run(&self, request: Request) -> Exchange {
        let request = if request.path_params().is_empty() {
            match self.template.capture(request.path()) {
                Some(params) if !params.is_empty() => request.with_path_params(params),
                _ => request,
            }
        } else {
            request
        };

        let span = tracing::info_span!(
            "endpoint",
            method = %self.method,
            path = %self.template,
            request_id = %request.id(),
        );
        let _guard = span.enter();

        let exchange = self.call(Exchange::new(request)).into_exchange();
        tracing::debug!(status = exchange.status().as_u16(), "endpoint finished");
        exchange
    }

    /// Runs the steps, then the responder for the resulting status.
    pub fn call(&self, exchange: Exchange) -> Outcome {
        let exchange = self.pipeline.call(exchange).resume().into_exchange();

        let status = exchange.status().as_u16();
        let accept = exchange.request().accept().unwrap_or(&self.default_accept);

        match self.registry.resolve(status, accept) {
            Some(responder) => responder.call(exchange),
            None => no_responder(exchange),
        }
    }

    /// Documentation model for exporters.
    #[must_use]
    pub fn documentation(&self) -> EndpointDoc {
        let schemas = self.pipeline.schemas();
        EndpointDoc {
            method: self.method.to_string(),
            path: self.template.to_string(),
            description: self.description.clone(),
            parameters: schemas.query().documentation(),
            headers: schemas.header().documentation(),
            payloads: schemas
                .payloads()
                .map(|(ct, schema)| (ct.essence(), schema.documentation()))
                .collect(),
            responders: self
                .registry
                .responders()
                .map(|r| r.documentation())
                .collect(),
            security: self
                .security
                .iter()
                .map(|step| SecurityDoc {
                    scheme: step.scheme().name().to_string(),
                    scopes: step.scopes().to_vec(),
                    definition: step.scheme().documentation(),
                })
                .collect(),
        }
    }
}

fn no_responder(mut exchange: Exchange) -> Outcome {
    let status = exchange.status().as_u16();
    tracing::warn!(status, "no responder registered");

    let body = json!({
        "message": format!("no responder registered for response status: {status}"),
    });
    exchange
        .response_mut()
        .set_content_type(&ContentType::json());
    exchange.response_mut().set_body(body.to_string());
    exchange.proceed()
}

fn builtin_responders() -> Result<Vec<Responder>, ConfigurationError> {
    Ok(vec![
        Responder::builder(204).describe("No Content").build()?,
        Responder::builder(304).describe("Not Modified").build()?,
        Responder::builder(200..=299)
            .describe("Success")
            .serialize(DefaultEntity)
            .build()?,
        Responder::builder(400..=499)
            .describe("Client error")
            .serialize(DefaultEntity)
            .build()?,
    ])
}

/// An endpoint nests as a step, exposing its accumulated schemas.
///
/// A step carries one payload fragment, so only the first declared payload
/// content type is contributed to the outer pipeline.
impl Step for Endpoint {
    fn name(&self) -> &str {
        "endpoint"
    }

    fn call(&self, exchange: Exchange) -> Outcome {
        Endpoint::call(self, exchange)
    }

    fn query_schema(&self) -> Option<&Schema> {
        Some(self.pipeline.schemas().query())
    }

    fn payload_schema(&self) -> Option<(&ContentType, &Schema)> {
        self.pipeline.schemas().payloads().next()
    }

    fn header_schema(&self) -> Option<&Schema> {
        Some(self.pipeline.schemas().header())
    }
}

/// Builder for [`Endpoint`].
///
/// Configuration errors are recorded and the first one is returned by
/// [`build`](EndpointBuilder::build).
#[derive(Debug)]
pub struct EndpointBuilder {
    method: Method,
    template: Result<PathTemplate, RouteError>,
    description: Option<String>,
    pipeline: PipelineBuilder,
    query_cell: Option<SchemaCell>,
    payload_cells: Vec<(ContentType, SchemaCell)>,
    header_cell: Option<SchemaCell>,
    responders: Vec<Responder>,
    security: Vec<SecurityStep>,
    schemes: Arc<SecuritySchemes>,
    inline_serializers: Arc<InlineSerializers>,
    default_accept: String,
    error: Option<ConfigurationError>,
}

impl EndpointBuilder {
    fn new(method: Method, path: &str) -> Self {
        let template = PathTemplate::parse(path);
        let tokens: Vec<String> = template
            .as_ref()
            .map(|t| t.tokens().map(str::to_string).collect())
            .unwrap_or_default();

        let mut builder = Self {
            method,
            template,
            description: None,
            pipeline: PipelineBuilder::new().path_tokens(tokens.iter().cloned()),
            query_cell: None,
            payload_cells: Vec::new(),
            header_cell: None,
            responders: Vec::new(),
            security: Vec::new(),
            schemes: Arc::new(SecuritySchemes::new()),
            inline_serializers: Arc::new(InlineSerializers::default()),
            default_accept: ContentType::any().to_string(),
            error: None,
        };

        if !tokens.is_empty() {
            let implicit: Schema = tokens
                .into_iter()
                .map(|token| (token, Field::new(Type::string()).at(Location::Path)))
                .collect();
            builder.push_query(implicit);
        }
        builder
    }

    fn record(&mut self, error: ConfigurationError) {
        self.error.get_or_insert(error);
    }

    fn push_query(&mut self, schema: Schema) {
        let step = match &self.query_cell {
            Some(_) => QueryValidation::contributor(schema),
            None => {
                let cell = Arc::new(OnceLock::new());
                self.query_cell = Some(Arc::clone(&cell));
                QueryValidation::primary(schema, cell)
            }
        };
        self.pipeline.push(Arc::new(step));
    }

    /// Declares path and query fields.
    #[must_use]
    pub fn query_schema(mut self, schema: Schema) -> Self {
        self.push_query(schema);
        self
    }

    /// Declares JSON body fields (also applied to form and multipart bodies).
    #[must_use]
    pub fn payload_schema(self, schema: Schema) -> Self {
        self.payload_schema_for(ContentType::json(), schema)
    }

    /// Declares body fields for one content type.
    #[must_use]
    pub fn payload_schema_for<C>(mut self, content_type: C, schema: Schema) -> Self
    where
        C: TryInto<ContentType>,
        ConfigurationError: From<C::Error>,
    {
        let content_type = match content_type.try_into() {
            Ok(ct) => ct,
            Err(e) => {
                self.record(e.into());
                return self;
            }
        };

        let existing = self
            .payload_cells
            .iter()
            .any(|(ct, _)| ct.essence() == content_type.essence());
        let step = if existing {
            PayloadValidation::contributor(content_type, schema)
        } else {
            let cell = Arc::new(OnceLock::new());
            self.payload_cells
                .push((content_type.clone(), Arc::clone(&cell)));
            PayloadValidation::primary(content_type, schema, cell)
        };
        self.pipeline.push(Arc::new(step));
        self
    }

    /// Declares header fields.
    #[must_use]
    pub fn header_schema(mut self, schema: Schema) -> Self {
        let step = match &self.header_cell {
            Some(_) => HeaderValidation::contributor(schema),
            None => {
                let cell = Arc::new(OnceLock::new());
                self.header_cell = Some(Arc::clone(&cell));
                HeaderValidation::primary(schema, cell)
            }
        };
        self.pipeline.push(Arc::new(step));
        self
    }

    /// Requires `scopes` from `scheme`.
    #[must_use]
    pub fn security<I, S>(mut self, scheme: SharedScheme, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let step = SecurityStep::new(scheme, scopes);
        self.security.push(step.clone());
        self.pipeline.push(Arc::new(step));
        self
    }

    /// Requires `scopes` from a scheme registered under `name`.
    #[must_use]
    pub fn security_named<I, S>(mut self, name: &str, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.schemes.get(name) {
            Ok(scheme) => {
                let scheme = Arc::clone(scheme);
                self.security(scheme, scopes)
            }
            Err(e) => {
                self.record(e);
                self
            }
        }
    }

    /// Schemes available to [`security_named`](Self::security_named).
    #[must_use]
    pub fn security_schemes(mut self, schemes: Arc<SecuritySchemes>) -> Self {
        self.schemes = schemes;
        self
    }

    /// Appends a business step.
    #[must_use]
    pub fn step<S: Step>(mut self, step: S) -> Self {
        self.pipeline.push(Arc::new(step));
        self
    }

    /// Appends a closure step.
    #[must_use]
    pub fn step_fn<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Exchange) -> Outcome + Send + Sync + 'static,
    {
        self.step(FnStep::new(name, f))
    }

    /// Registers a responder configured by `configure`.
    ///
    /// Responders registered here take precedence over the built-in ones.
    #[must_use]
    pub fn respond<R, F>(mut self, statuses: R, configure: F) -> Self
    where
        R: TryInto<StatusRange>,
        ConfigurationError: From<R::Error>,
        F: FnOnce(ResponderBuilder) -> ResponderBuilder,
    {
        let builder = Responder::builder(statuses)
            .inline_serializers(Arc::clone(&self.inline_serializers));
        match configure(builder).build() {
            Ok(responder) => self.responders.push(responder),
            Err(e) => self.record(e),
        }
        self
    }

    /// Inline serializer table handed to responders declared after this call.
    #[must_use]
    pub fn inline_serializers(mut self, table: Arc<InlineSerializers>) -> Self {
        self.inline_serializers = table;
        self
    }

    /// Accept value used when a request sends none (default `*/*`).
    #[must_use]
    pub fn default_accept(mut self, accept: impl Into<String>) -> Self {
        self.default_accept = accept.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Freezes the endpoint.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error: an invalid path template,
    /// content type or status range, a duplicate serializer, an unknown
    /// security scheme or inline serializer subtype.
    pub fn build(self) -> Result<Endpoint, ConfigurationError> {
        let template = self.template?;
        if let Some(error) = self.error {
            return Err(error);
        }

        let pipeline = self.pipeline.build();
        let schemas = pipeline.schemas();
        if let Some(cell) = &self.query_cell {
            let _ = cell.set(schemas.query().clone());
        }
        for (content_type, cell) in &self.payload_cells {
            if let Some(schema) = schemas.payload(content_type) {
                let _ = cell.set(schema.clone());
            }
        }
        if let Some(cell) = &self.header_cell {
            let _ = cell.set(schemas.header().clone());
        }

        let mut registry = ResponderRegistry::new();
        for responder in self.responders {
            registry.register(responder)?;
        }
        for responder in builtin_responders()? {
            registry.register(responder)?;
        }

        Ok(Endpoint {
            method: self.method,
            template,
            description: self.description,
            pipeline,
            registry,
            security: self.security,
            default_accept: self.default_accept,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serializer::Entity;
    use crate::security::SecurityScheme;
    use http::{StatusCode, Uri};
    use serde_json::{json, Value};
    use sluice_core::{ErrorCategory, Payload};

    fn get(uri: &'static str) -> Request {
        Request::new(Method::GET, Uri::from_static(uri))
    }

    fn body(exchange: &Exchange) -> Value {
        serde_json::from_slice(exchange.response().body()).unwrap()
    }

    #[test]
    fn test_implicit_path_schema() {
        let endpoint = Endpoint::get("/users/:id/posts/:post").build().unwrap();
        let query = endpoint.schemas().query();
        assert_eq!(query.len(), 2);
        assert_eq!(query.get("post").unwrap().location(), Some(Location::Path));

        let exchange = endpoint.run(get("/users/7/posts/abc"));
        assert_eq!(exchange.status(), StatusCode::OK);
        assert_eq!(exchange.param("id"), Some(&json!("7")));
        assert_eq!(exchange.param("post"), Some(&json!("abc")));
    }

    #[test]
    fn test_explicit_query_schema_keeps_path_location() {
        let endpoint = Endpoint::get("/users/:id")
            .query_schema(
                Schema::new()
                    .field("id", Type::lax_integer())
                    .field("verbose", Type::lax_boolean().optional()),
            )
            .build()
            .unwrap();

        let query = endpoint.schemas().query();
        assert_eq!(query.get("id").unwrap().location(), Some(Location::Path));
        assert_eq!(query.get("verbose").unwrap().location(), Some(Location::Query));

        let exchange = endpoint.run(get("/users/42?verbose=true"));
        assert_eq!(exchange.param("id"), Some(&json!(42)));
        assert_eq!(exchange.param("verbose"), Some(&json!(true)));
    }

    #[test]
    fn test_validation_failure_uses_default_envelope() {
        let endpoint = Endpoint::get("/users/:id")
            .query_schema(Schema::new().field("id", Type::lax_integer().within(18..)))
            .build()
            .unwrap();

        let exchange = endpoint.run(get("/users/17"));
        assert_eq!(exchange.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(exchange.response().content_type(), Some("application/json"));
        assert_eq!(
            body(&exchange),
            json!({
                "http": {"status": 422},
                "params": {"id": 17},
                "errors": {"id": "Must be within 18.."}
            })
        );
    }

    #[test]
    fn test_later_query_fragments_validate_once() {
        let endpoint = Endpoint::get("/search")
            .query_schema(Schema::new().field("q", Type::string()))
            .step_fn("noop", Exchange::proceed)
            .query_schema(Schema::new().field("page", Type::lax_integer()))
            .build()
            .unwrap();

        let exchange = endpoint.run(get("/search?q=rust"));
        assert_eq!(exchange.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(exchange.errors().len(), 1);
        assert_eq!(exchange.errors()["page"], "Is required");
    }

    #[test]
    fn test_custom_responder_wins_over_builtin() {
        #[derive(Debug)]
        struct User {
            name: String,
        }

        let endpoint = Endpoint::get("/me")
            .step_fn("load", |ex: Exchange| {
                ex.with_value(Payload::new(User {
                    name: "ada".to_string(),
                }))
                .proceed()
            })
            .respond(200, |r| {
                r.serialize(Entity::<User>::new().attribute("name", |u: &User| u.name.clone()))
            })
            .build()
            .unwrap();

        let exchange = endpoint.run(get("/me"));
        assert_eq!(body(&exchange), json!({"name": "ada"}));
    }

    #[test]
    fn test_no_content_builtin() {
        let endpoint = Endpoint::delete("/items/:id")
            .step_fn("delete", |ex: Exchange| ex.with_status(StatusCode::NO_CONTENT).proceed())
            .build()
            .unwrap();

        let exchange = endpoint.run(Request::new(Method::DELETE, Uri::from_static("/items/1")));
        assert_eq!(exchange.status(), StatusCode::NO_CONTENT);
        assert!(exchange.response().body().is_empty());
    }

    #[test]
    fn test_unmatched_status_fallback() {
        let endpoint = Endpoint::get("/boom")
            .step_fn("fail", |ex: Exchange| {
                ex.with_status(StatusCode::SERVICE_UNAVAILABLE).halt()
            })
            .build()
            .unwrap();

        let exchange = endpoint.run(get("/boom"));
        assert_eq!(exchange.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            body(&exchange),
            json!({"message": "no responder registered for response status: 503"})
        );
    }

    #[test]
    fn test_accept_negotiation() {
        let endpoint = Endpoint::get("/page")
            .respond(200, |r| {
                r.accepts("html").render(|_: &Exchange| json!("<p>hi</p>"))
            })
            .build()
            .unwrap();

        let exchange = endpoint.run(get("/page").with_header("accept", "text/html"));
        assert_eq!(exchange.response().content_type(), Some("text/html"));
        assert_eq!(exchange.response().body().as_ref(), b"<p>hi</p>");

        let exchange = endpoint.run(get("/page").with_header("accept", "application/json"));
        assert_eq!(exchange.response().content_type(), Some("application/json"));
    }

    #[test]
    fn test_default_accept() {
        let endpoint = Endpoint::get("/page")
            .respond(200, |r| r.accepts("html").render(|_: &Exchange| json!("html")))
            .default_accept("application/json")
            .build()
            .unwrap();

        let exchange = endpoint.run(get("/page"));
        assert_eq!(exchange.response().content_type(), Some("application/json"));
    }

    #[test]
    fn test_declaration_order() {
        struct Deny;

        impl SecurityScheme for Deny {
            fn name(&self) -> &str {
                "deny"
            }

            fn handle(&self, exchange: Exchange, _scopes: &[String]) -> Outcome {
                exchange.fail(
                    ErrorCategory::Authentication,
                    [("authorization".to_string(), "Is required".to_string())],
                )
            }

            fn documentation(&self) -> Value {
                json!({"type": "http", "scheme": "deny"})
            }
        }

        let endpoint = Endpoint::get("/secret")
            .security(Arc::new(Deny), ["read"])
            .query_schema(Schema::new().field("q", Type::string()))
            .build()
            .unwrap();

        let exchange = endpoint.run(get("/secret"));
        assert_eq!(exchange.status(), StatusCode::UNAUTHORIZED);
        assert!(exchange.errors().get("q").is_none());
        assert_eq!(
            endpoint.pipeline().step_names(),
            vec!["security", "query-validation"]
        );
    }

    #[test]
    fn test_configuration_errors() {
        assert!(matches!(
            Endpoint::get("no-slash").build(),
            Err(ConfigurationError::Route(_))
        ));
        assert!(matches!(
            Endpoint::get("/x").security_named("missing", ["a"]).build(),
            Err(ConfigurationError::UnknownSecurityScheme { name }) if name == "missing"
        ));
        assert!(matches!(
            Endpoint::get("/x")
                .respond(200, |r| r.serialize(DefaultEntity).serialize(DefaultEntity))
                .build(),
            Err(ConfigurationError::DuplicateSerializer { .. })
        ));
        assert!(matches!(
            Endpoint::post("/x").payload_schema_for("bogus", Schema::new()).build(),
            Err(ConfigurationError::InvalidContentType(_))
        ));
    }

    #[test]
    fn test_documentation() {
        struct Token;

        impl SecurityScheme for Token {
            fn name(&self) -> &str {
                "token"
            }

            fn handle(&self, exchange: Exchange, _scopes: &[String]) -> Outcome {
                exchange.proceed()
            }

            fn documentation(&self) -> Value {
                json!({"type": "http", "scheme": "bearer"})
            }
        }

        let endpoint = Endpoint::post("/users/:id")
            .describe("Update a user")
            .security(Arc::new(Token), ["write"])
            .payload_schema(Schema::new().field("name", Type::string().optional()))
            .respond(200, |r| r.describe("Updated user").serialize(DefaultEntity))
            .build()
            .unwrap();

        let doc = serde_json::to_value(endpoint.documentation()).unwrap();
        assert_eq!(doc["method"], "POST");
        assert_eq!(doc["path"], "/users/:id");
        assert_eq!(doc["description"], "Update a user");
        assert_eq!(doc["parameters"]["id"]["in"], "path");
        assert_eq!(doc["payloads"]["application/json"]["name"]["in"], "body");
        assert_eq!(doc["responders"][0]["statuses"], "200");
        assert_eq!(doc["responders"][0]["description"], "Updated user");
        assert_eq!(doc["responders"].as_array().unwrap().len(), 5);
        assert_eq!(doc["security"][0]["scheme"], "token");
        assert_eq!(doc["security"][0]["scopes"], json!(["write"]));
    }

    #[test]
    fn test_nested_endpoint_contributes_first_payload() {
        let endpoint = Endpoint::post("/users")
            .payload_schema(Schema::new().field("name", Type::string()))
            .payload_schema_for(ContentType::form(), Schema::new().field("token", Type::string()))
            .build()
            .unwrap();
        assert_eq!(endpoint.schemas().payloads().count(), 2);

        let (content_type, schema) = Step::payload_schema(&endpoint).unwrap();
        assert_eq!(content_type.essence(), "application/json");
        assert!(schema.get("name").is_some());

        let outer = Pipeline::builder().step(endpoint).build();
        assert!(outer.schemas().payload(&ContentType::json()).is_some());
        assert!(outer.schemas().payload(&ContentType::form()).is_none());
    }
}
