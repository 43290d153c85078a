//! Field schemas: declaration, merging and resolution.
//!
//! A [`Schema`] is an ordered map of field name → [`Field`]. Resolving raw
//! input against it coerces each field to its [`Type`], applies constraints
//! and returns a [`Resolution`] holding both the coerced values and any field
//! errors. Coerced values are kept even when a constraint fails, so an error
//! response can still echo what was understood.
//!
//! ```
//! use sluice_core::schema::{Schema, Type};
//! use serde_json::json;
//!
//! let schema = Schema::new()
//!     .field("id", Type::lax_integer().within(18..))
//!     .field("name", Type::string().optional());
//!
//! let input = json!({"id": "17"});
//! let resolution = schema.resolve(input.as_object().unwrap());
//!
//! assert_eq!(resolution.value["id"], json!(17));
//! assert_eq!(resolution.errors["id"], "Must be within 18..");
//! ```

use std::fmt;
use std::ops::{Add, AddAssign, Bound, RangeBounds};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Map, Number, Value};

use crate::error::ErrorMap;
use crate::exchange::ParamMap;

/// Where a field is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    /// Captured from the path template
    Path,
    /// Query string
    Query,
    /// Request header
    Header,
    /// Request body
    Body,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
            Self::Body => "body",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Kind {
    String,
    Integer { lax: bool },
    Number { lax: bool },
    Boolean { lax: bool },
    Array(Box<Type>),
    Object(Schema),
    Any,
}

#[derive(Debug, Clone, PartialEq)]
enum Constraint {
    Within {
        start: Bound<f64>,
        end: Bound<f64>,
        label: String,
    },
    OneOf(Vec<Value>),
}

impl Constraint {
    fn check(&self, value: &Value) -> Option<String> {
        match self {
            Self::Within { start, end, label } => {
                let measure = match value {
                    Value::Number(n) => n.as_f64(),
                    Value::String(s) => Some(s.chars().count() as f64),
                    Value::Array(items) => Some(items.len() as f64),
                    _ => None,
                }?;
                let above = match start {
                    Bound::Included(s) => measure >= *s,
                    Bound::Excluded(s) => measure > *s,
                    Bound::Unbounded => true,
                };
                let below = match end {
                    Bound::Included(e) => measure <= *e,
                    Bound::Excluded(e) => measure < *e,
                    Bound::Unbounded => true,
                };
                (!(above && below)).then(|| format!("Must be within {label}"))
            }
            Self::OneOf(allowed) => (!allowed.contains(value)).then(|| {
                let names: Vec<String> = allowed.iter().map(display_value).collect();
                format!("Must be one of: {}", names.join(", "))
            }),
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// A field's value type plus constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    kind: Kind,
    constraints: Vec<Constraint>,
}

impl Type {
    fn of(kind: Kind) -> Self {
        Self {
            kind,
            constraints: Vec::new(),
        }
    }

    /// A JSON string.
    #[must_use]
    pub fn string() -> Self {
        Self::of(Kind::String)
    }

    /// A JSON integer.
    #[must_use]
    pub fn integer() -> Self {
        Self::of(Kind::Integer { lax: false })
    }

    /// An integer that also accepts numeric strings such as `"42"`.
    #[must_use]
    pub fn lax_integer() -> Self {
        Self::of(Kind::Integer { lax: true })
    }

    /// A JSON number.
    #[must_use]
    pub fn number() -> Self {
        Self::of(Kind::Number { lax: false })
    }

    /// A number that also accepts numeric strings.
    #[must_use]
    pub fn lax_number() -> Self {
        Self::of(Kind::Number { lax: true })
    }

    /// A JSON boolean.
    #[must_use]
    pub fn boolean() -> Self {
        Self::of(Kind::Boolean { lax: false })
    }

    /// A boolean that also accepts `"true"`, `"1"`, `"yes"`, `"on"` and their negations.
    #[must_use]
    pub fn lax_boolean() -> Self {
        Self::of(Kind::Boolean { lax: true })
    }

    /// An array of `item`; a single scalar is read as a one-element array.
    #[must_use]
    pub fn array(item: Type) -> Self {
        Self::of(Kind::Array(Box::new(item)))
    }

    /// A nested object.
    #[must_use]
    pub fn object(schema: Schema) -> Self {
        Self::of(Kind::Object(schema))
    }

    /// Anything, passed through untouched.
    #[must_use]
    pub fn any() -> Self {
        Self::of(Kind::Any)
    }

    /// Constrains a number's value, or a string's or array's length.
    ///
    /// The error message uses the range as written: `18..`, `1..=10`.
    #[must_use]
    pub fn within<R>(mut self, range: R) -> Self
    where
        R: RangeBounds<i64> + fmt::Debug,
    {
        let convert = |bound: Bound<&i64>| match bound {
            Bound::Included(v) => Bound::Included(*v as f64),
            Bound::Excluded(v) => Bound::Excluded(*v as f64),
            Bound::Unbounded => Bound::Unbounded,
        };
        self.constraints.push(Constraint::Within {
            start: convert(range.start_bound()),
            end: convert(range.end_bound()),
            label: format!("{range:?}"),
        });
        self
    }

    /// Restricts the value to a fixed set.
    #[must_use]
    pub fn one_of<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.constraints
            .push(Constraint::OneOf(values.into_iter().map(Into::into).collect()));
        self
    }

    /// Turns this type into an optional field.
    #[must_use]
    pub fn optional(self) -> Field {
        Field::new(self).optional()
    }

    /// Short type name used in documentation.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.kind {
            Kind::String => "string",
            Kind::Integer { .. } => "integer",
            Kind::Number { .. } => "number",
            Kind::Boolean { .. } => "boolean",
            Kind::Array(_) => "array",
            Kind::Object(_) => "object",
            Kind::Any => "any",
        }
    }

    /// Structured description of the type for documentation consumers.
    #[must_use]
    pub fn documentation(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("type".into(), json!(self.name()));
        match &self.kind {
            Kind::Integer { lax: true }
            | Kind::Number { lax: true }
            | Kind::Boolean { lax: true } => {
                doc.insert("lax".into(), json!(true));
            }
            Kind::Array(item) => {
                doc.insert("items".into(), item.documentation());
            }
            Kind::Object(schema) => {
                doc.insert("properties".into(), schema.documentation());
            }
            _ => {}
        }
        for constraint in &self.constraints {
            match constraint {
                Constraint::Within { label, .. } => doc.insert("within".into(), json!(label)),
                Constraint::OneOf(values) => doc.insert("one_of".into(), json!(values)),
            };
        }
        Value::Object(doc)
    }

    /// Coerces `raw`, recording failures under `key` (or nested keys).
    fn coerce(&self, key: &str, raw: &Value, errors: &mut ErrorMap) -> Option<Value> {
        let coerced = match &self.kind {
            Kind::String if raw.is_string() => Ok(raw.clone()),
            Kind::String => Err("Must be a string"),
            Kind::Integer { lax } => coerce_integer(raw, *lax).ok_or("Must be an integer"),
            Kind::Number { lax } => coerce_number(raw, *lax).ok_or("Must be a number"),
            Kind::Boolean { lax } => coerce_boolean(raw, *lax).ok_or("Must be a boolean"),
            Kind::Array(item) => {
                let items = match raw {
                    Value::Array(items) => items.clone(),
                    Value::Object(_) => {
                        errors.insert(key.to_string(), "Must be an array".to_string());
                        return None;
                    }
                    scalar => vec![scalar.clone()],
                };
                let before = errors.len();
                let coerced: Vec<Value> = items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| item.coerce(&format!("{key}.{i}"), v, errors))
                    .collect();
                if errors.len() > before {
                    return None;
                }
                Ok(Value::Array(coerced))
            }
            Kind::Object(schema) => match raw {
                Value::Object(map) => {
                    let nested = schema.resolve(map);
                    let valid = nested.is_valid();
                    errors.extend(
                        nested
                            .errors
                            .into_iter()
                            .map(|(k, v)| (format!("{key}.{k}"), v)),
                    );
                    let value = Value::Object(nested.value.into_iter().collect());
                    if !valid {
                        return Some(value);
                    }
                    Ok(value)
                }
                _ => Err("Must be an object"),
            },
            Kind::Any => Ok(raw.clone()),
        };

        match coerced {
            Ok(value) => {
                if let Some(message) = self.constraints.iter().find_map(|c| c.check(&value)) {
                    errors.insert(key.to_string(), message);
                }
                Some(value)
            }
            Err(message) => {
                errors.insert(key.to_string(), message.to_string());
                None
            }
        }
    }
}

fn coerce_integer(raw: &Value, lax: bool) -> Option<Value> {
    match raw {
        Value::Number(n) if n.is_i64() || n.is_u64() => Some(raw.clone()),
        Value::String(s) if lax => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn coerce_number(raw: &Value, lax: bool) -> Option<Value> {
    match raw {
        Value::Number(_) => Some(raw.clone()),
        Value::String(s) if lax => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Some(Value::from(i));
            }
            trimmed
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number)
        }
        _ => None,
    }
}

fn coerce_boolean(raw: &Value, lax: bool) -> Option<Value> {
    match raw {
        Value::Bool(_) => Some(raw.clone()),
        Value::String(s) if lax => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(Value::Bool(true)),
            "false" | "0" | "no" | "off" => Some(Value::Bool(false)),
            _ => None,
        },
        Value::Number(n) if lax => match n.as_i64() {
            Some(1) => Some(Value::Bool(true)),
            Some(0) => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

/// A schema entry: a type plus metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    ty: Type,
    required: bool,
    default: Option<Value>,
    location: Option<Location>,
    description: Option<String>,
    example: Option<Value>,
    sensitive: bool,
}

impl Field {
    /// A required field of type `ty`.
    #[must_use]
    pub fn new(ty: Type) -> Self {
        Self {
            ty,
            required: true,
            default: None,
            location: None,
            description: None,
            example: None,
            sensitive: false,
        }
    }

    /// Allows the field to be absent.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Value used when the field is absent; implies optional.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.required = false;
        self.default = Some(value.into());
        self
    }

    /// Pins the field to a location.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Validates the field but keeps its value out of the resolved params.
    ///
    /// Used for credentials, which must never reach a response body.
    #[must_use]
    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    /// Adds a human description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds an example value.
    #[must_use]
    pub fn example(mut self, example: impl Into<Value>) -> Self {
        self.example = Some(example.into());
        self
    }

    /// The field's type.
    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    /// Whether the field must be present.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Location, once assigned.
    #[must_use]
    pub fn location(&self) -> Option<Location> {
        self.location
    }

    /// Human description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Example value.
    #[must_use]
    pub fn example_value(&self) -> Option<&Value> {
        self.example.as_ref()
    }

    /// True when resolved values are withheld from params.
    #[must_use]
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// Value used when the field is absent.
    #[must_use]
    pub fn fallback_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Structured description of the field for documentation consumers.
    #[must_use]
    pub fn documentation(&self) -> Value {
        let mut doc = match self.ty.documentation() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        doc.insert("required".into(), json!(self.required));
        if let Some(location) = self.location {
            doc.insert("in".into(), json!(location));
        }
        if let Some(description) = &self.description {
            doc.insert("description".into(), json!(description));
        }
        if let Some(example) = &self.example {
            doc.insert("example".into(), example.clone());
        }
        if let Some(default) = &self.default {
            doc.insert("default".into(), default.clone());
        }
        Value::Object(doc)
    }
}

impl From<Type> for Field {
    fn from(ty: Type) -> Self {
        Self::new(ty)
    }
}

/// Outcome of resolving input against a schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Resolution {
    /// Coerced values, in schema field order
    pub value: ParamMap,
    /// Field errors; empty when valid
    pub errors: ErrorMap,
}

impl Resolution {
    /// True when no field failed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// An ordered field name → [`Field`] mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: IndexMap<String, Field>,
}

impl Schema {
    /// An empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, field: impl Into<Field>) -> Self {
        self.fields.insert(name.into(), field.into());
        self
    }

    /// Looks up a field.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// Iterates fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the schema has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Assigns a location to every field that has none yet.
    #[must_use]
    pub fn located(mut self, location: Location) -> Self {
        for field in self.fields.values_mut() {
            field.location.get_or_insert(location);
        }
        self
    }

    /// Assigns locations field by field; fields that already have one keep it.
    #[must_use]
    pub fn located_by(mut self, locate: impl Fn(&str) -> Location) -> Self {
        for (name, field) in &mut self.fields {
            if field.location.is_none() {
                field.location = Some(locate(name));
            }
        }
        self
    }

    /// Merges `other` into `self`; `other` wins on conflicts, except that a
    /// field already located at [`Location::Path`] stays there and a
    /// sensitive field stays sensitive.
    pub fn merge(&mut self, other: Schema) {
        for (name, mut field) in other.fields {
            if let Some(existing) = self.fields.get(&name) {
                if existing.location == Some(Location::Path) {
                    field.location = Some(Location::Path);
                }
                field.sensitive |= existing.sensitive;
            }
            self.fields.insert(name, field);
        }
    }

    /// Resolves raw input; keys not in the schema are dropped.
    #[must_use]
    pub fn resolve(&self, input: &Map<String, Value>) -> Resolution {
        let mut resolution = Resolution::default();

        for (name, field) in &self.fields {
            let raw = input.get(name).filter(|v| !v.is_null());
            match raw {
                Some(raw) => {
                    let value = field.ty.coerce(name, raw, &mut resolution.errors);
                    if let Some(value) = value.filter(|_| !field.sensitive) {
                        resolution.value.insert(name.clone(), value);
                    }
                }
                None => {
                    if field.sensitive {
                        if field.required {
                            resolution
                                .errors
                                .insert(name.clone(), "Is required".to_string());
                        }
                    } else if let Some(default) = &field.default {
                        resolution.value.insert(name.clone(), default.clone());
                    } else if field.required {
                        resolution
                            .errors
                            .insert(name.clone(), "Is required".to_string());
                    }
                }
            }
        }

        resolution
    }

    /// Field name → field documentation.
    #[must_use]
    pub fn documentation(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, field)| (name.clone(), field.documentation()))
                .collect(),
        )
    }
}

impl Add for Schema {
    type Output = Schema;

    fn add(mut self, rhs: Schema) -> Schema {
        self.merge(rhs);
        self
    }
}

impl AddAssign for Schema {
    fn add_assign(&mut self, rhs: Schema) {
        self.merge(rhs);
    }
}

impl<K: Into<String>, F: Into<Field>> FromIterator<(K, F)> for Schema {
    fn from_iter<I: IntoIterator<Item = (K, F)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, f)| (k.into(), f.into()))
                .collect(),
        }
    }
}
