//! Terminal formatting of an exchange into a response body.
//!
//! | Serializer | Output |
//! |---|---|
//! | [`Entity`] | JSON built from explicit attribute accessors |
//! | [`DefaultEntity`] | `{http: {status}, params, errors}` envelope |
//! | [`Template`] | HTML (or any text) rendered with `minijinja` |
//! | inline closures | built per subtype by [`InlineSerializers`] |

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use minijinja::Environment;
use serde::Serialize;
use serde_json::{json, Map, Value};
use sluice_core::{ConfigurationError, ContentType, Exchange, Payload};
use thiserror::Error;

/// Failure to render a response body.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The serializer needs a value and the exchange has none.
    #[error("no value to render")]
    MissingValue,

    /// The value is not of the type the serializer renders.
    #[error("expected {expected}, found {found}")]
    UnexpectedValue {
        /// What the serializer renders
        expected: &'static str,
        /// What the exchange holds
        found: String,
    },

    /// JSON encoding failed.
    #[error("failed to encode JSON: {0}")]
    Encode(#[from] serde_json::Error),

    /// Template rendering failed.
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
}

/// Converts an exchange into a response body.
pub trait Serializer: Send + Sync + 'static {
    /// Renders the body.
    fn render(&self, exchange: &Exchange) -> Result<String, RenderError>;

    /// True when the serializer produces output for an exchange with no value.
    fn renders_without_value(&self) -> bool {
        false
    }
}

type Accessor<T> = Box<dyn Fn(&T) -> Result<Value, serde_json::Error> + Send + Sync>;

/// JSON attribute mapping for values of type `T`.
///
/// Renders a `T` as an object and a `Vec<T>` as an array of objects.
///
/// ```rust
/// use sluice_pipeline::Entity;
///
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// let entity = Entity::<User>::new()
///     .attribute("id", |u| u.id)
///     .attribute("display_name", |u| u.name.to_uppercase());
///
/// let json = entity.represent(&User { id: 1, name: "ada".into() }).unwrap();
/// assert_eq!(json, serde_json::json!({"id": 1, "display_name": "ADA"}));
/// ```
pub struct Entity<T> {
    attributes: Vec<(String, Accessor<T>)>,
}

impl<T: Any + Send + Sync> Entity<T> {
    /// An entity with no attributes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            attributes: Vec::new(),
        }
    }

    /// Adds an attribute computed by `accessor`.
    #[must_use]
    pub fn attribute<V, F>(mut self, name: impl Into<String>, accessor: F) -> Self
    where
        V: Serialize,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.attributes.push((
            name.into(),
            Box::new(move |item| serde_json::to_value(accessor(item))),
        ));
        self
    }

    /// Maps one item to its JSON object.
    pub fn represent(&self, item: &T) -> Result<Value, serde_json::Error> {
        let mut map = Map::with_capacity(self.attributes.len());
        for (name, accessor) in &self.attributes {
            map.insert(name.clone(), accessor(item)?);
        }
        Ok(Value::Object(map))
    }

    fn represent_payload(&self, payload: &Payload) -> Result<Value, RenderError> {
        if let Some(item) = payload.downcast_ref::<T>() {
            return Ok(self.represent(item)?);
        }
        if let Some(items) = payload.downcast_ref::<Vec<T>>() {
            let items = items
                .iter()
                .map(|item| self.represent(item))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(Value::Array(items));
        }
        Err(RenderError::UnexpectedValue {
            expected: std::any::type_name::<T>(),
            found: payload.type_name().to_string(),
        })
    }
}

impl<T: Any + Send + Sync> Default for Entity<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Any + Send + Sync> Serializer for Entity<T> {
    fn render(&self, exchange: &Exchange) -> Result<String, RenderError> {
        let payload = exchange.value().ok_or(RenderError::MissingValue)?;
        let json = self.represent_payload(payload)?;
        Ok(serde_json::to_string(&json)?)
    }
}

impl<T> fmt::Debug for Entity<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.attributes.iter().map(|(n, _)| n.as_str()).collect();
        f.debug_struct("Entity").field("attributes", &names).finish()
    }
}

/// The envelope used by built-in responders.
///
/// ```json
/// {"http": {"status": 422}, "params": {"id": 17}, "errors": {"id": "Must be within 18.."}}
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultEntity;

impl DefaultEntity {
    /// The envelope as a JSON value.
    #[must_use]
    pub fn envelope(exchange: &Exchange) -> Value {
        json!({
            "http": { "status": exchange.status().as_u16() },
            "params": exchange.params(),
            "errors": exchange.errors(),
        })
    }
}

impl Serializer for DefaultEntity {
    fn render(&self, exchange: &Exchange) -> Result<String, RenderError> {
        Ok(serde_json::to_string(&Self::envelope(exchange))?)
    }

    fn renders_without_value(&self) -> bool {
        true
    }
}

/// A `minijinja` template.
///
/// The context holds `value` (the JSON view of the payload, if any),
/// `params`, `errors` and `status`.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    source: String,
}

impl Template {
    /// Compiles `source` once to reject syntax errors up front.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::InvalidTemplate`] when the template
    /// does not compile.
    pub fn new(
        name: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        let template = Self {
            name: name.into(),
            source: source.into(),
        };

        let mut env = Environment::new();
        env.add_template(&template.name, &template.source)
            .map_err(|e| ConfigurationError::InvalidTemplate {
                name: template.name.clone(),
                reason: e.to_string(),
            })?;
        drop(env);

        Ok(template)
    }

    /// Template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Serializer for Template {
    fn render(&self, exchange: &Exchange) -> Result<String, RenderError> {
        let mut env = Environment::new();
        env.add_template(&self.name, &self.source)?;
        let template = env.get_template(&self.name)?;

        let context = json!({
            "value": exchange.value().and_then(Payload::as_json),
            "params": exchange.params(),
            "errors": exchange.errors(),
            "status": exchange.status().as_u16(),
        });
        Ok(template.render(context)?)
    }

    fn renders_without_value(&self) -> bool {
        true
    }
}

/// An inline rendering closure.
pub type InlineFn = Arc<dyn Fn(&Exchange) -> Value + Send + Sync>;

/// Turns an inline closure into a serializer for one subtype.
pub type InlineBuilder = Arc<dyn Fn(InlineFn) -> Arc<dyn Serializer> + Send + Sync>;

struct InlineJson(InlineFn);

impl Serializer for InlineJson {
    fn render(&self, exchange: &Exchange) -> Result<String, RenderError> {
        Ok(serde_json::to_string(&(self.0)(exchange))?)
    }
}

struct InlineText(InlineFn);

impl Serializer for InlineText {
    fn render(&self, exchange: &Exchange) -> Result<String, RenderError> {
        match (self.0)(exchange) {
            Value::String(text) => Ok(text),
            other => Err(RenderError::UnexpectedValue {
                expected: "a string",
                found: other.to_string(),
            }),
        }
    }
}

/// Subtype → builder table for inline serializers.
///
/// Passed to responders explicitly; the default table knows `json`, `html`
/// and `plain`, and `+json` subtypes fall back to `json`.
///
/// ```rust
/// use std::sync::Arc;
/// use serde_json::json;
/// use sluice_core::{ContentType, Exchange};
/// use sluice_pipeline::InlineSerializers;
///
/// let table = InlineSerializers::default();
/// let csv = ContentType::parse("text/csv").unwrap();
/// assert!(table.build(&csv, Arc::new(|_: &Exchange| json!("a,b"))).is_err());
/// ```
#[derive(Clone)]
pub struct InlineSerializers {
    builders: HashMap<String, InlineBuilder>,
}

impl InlineSerializers {
    /// A table with no builders.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Registers (or replaces) the builder for `subtype`.
    #[must_use]
    pub fn register<F>(mut self, subtype: impl Into<String>, builder: F) -> Self
    where
        F: Fn(InlineFn) -> Arc<dyn Serializer> + Send + Sync + 'static,
    {
        self.builders.insert(subtype.into(), Arc::new(builder));
        self
    }

    /// Builds the serializer for `content_type` around `f`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::UnknownInlineSerializer`] when no
    /// builder handles the subtype.
    pub fn build(
        &self,
        content_type: &ContentType,
        f: InlineFn,
    ) -> Result<Arc<dyn Serializer>, ConfigurationError> {
        let subtype = content_type.subtype();
        let builder = self.builders.get(subtype).or_else(|| {
            subtype
                .ends_with("+json")
                .then(|| self.builders.get("json"))
                .flatten()
        });

        match builder {
            Some(builder) => Ok(builder(f)),
            None => Err(ConfigurationError::UnknownInlineSerializer {
                subtype: subtype.to_string(),
            }),
        }
    }
}

impl Default for InlineSerializers {
    fn default() -> Self {
        Self::empty()
            .register("json", |f| Arc::new(InlineJson(f)) as Arc<dyn Serializer>)
            .register("html", |f| Arc::new(InlineText(f)) as Arc<dyn Serializer>)
            .register("plain", |f| Arc::new(InlineText(f)) as Arc<dyn Serializer>)
    }
}

impl fmt::Debug for InlineSerializers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut subtypes: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        subtypes.sort_unstable();
        f.debug_struct("InlineSerializers")
            .field("subtypes", &subtypes)
            .finish()
    }
}
