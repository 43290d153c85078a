//! Path and query parameter validation.

use serde_json::Value;
use sluice_core::schema::Schema;
use sluice_core::{ErrorCategory, Exchange, Outcome};
use sluice_extract::parse_query;

use super::{Role, SchemaCell};
use crate::step::Step;

/// Resolves query string and path parameters against a schema.
///
/// Path parameters override query parameters of the same name. Coerced
/// values are merged into the exchange params even when resolution fails;
/// failures set 422 and halt.
#[derive(Debug, Clone)]
pub struct QueryValidation {
    fragment: Schema,
    role: Role,
}

impl QueryValidation {
    /// Validates against `schema` alone.
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self {
            fragment: schema,
            role: Role::Standalone,
        }
    }

    pub(crate) fn primary(schema: Schema, cell: SchemaCell) -> Self {
        Self {
            fragment: schema,
            role: Role::Primary(cell),
        }
    }

    pub(crate) fn contributor(schema: Schema) -> Self {
        Self {
            fragment: schema,
            role: Role::Contributor,
        }
    }
}

impl Step for QueryValidation {
    fn name(&self) -> &str {
        "query-validation"
    }

    fn call(&self, exchange: Exchange) -> Outcome {
        let Some(schema) = self.role.active(&self.fragment) else {
            return exchange.proceed();
        };

        let mut input = match parse_query(exchange.request().query_string()) {
            Ok(input) => input,
            Err(e) => {
                return exchange.fail(
                    ErrorCategory::BodyParse,
                    [("query".to_string(), e.message().to_string())],
                );
            }
        };
        for (name, value) in exchange.request().path_params().iter() {
            input.insert(name.to_string(), Value::String(value.to_string()));
        }

        let resolution = schema.resolve(&input);
        let exchange = exchange.with_params(resolution.value);

        if resolution.errors.is_empty() {
            exchange.proceed()
        } else {
            tracing::debug!(errors = resolution.errors.len(), "query validation failed");
            exchange.fail(ErrorCategory::Validation, resolution.errors)
        }
    }

    fn query_schema(&self) -> Option<&Schema> {
        Some(&self.fragment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode, Uri};
    use serde_json::json;
    use sluice_core::schema::Type;
    use sluice_core::Request;
    use sluice_router::Params;
    use std::sync::{Arc, OnceLock};

    fn exchange(uri: &'static str, path: &[(&str, &str)]) -> Exchange {
        let params: Params = path.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Exchange::new(Request::new(Method::GET, Uri::from_static(uri)).with_path_params(params))
    }

    #[test]
    fn test_coerces_and_merges_params() {
        let step = QueryValidation::new(
            Schema::new()
                .field("page", Type::lax_integer())
                .field("tag", Type::array(Type::string()).optional()),
        );

        let outcome = step.call(exchange("/items?page=3&tag=a&tag=b", &[]));
        assert!(!outcome.is_halted());
        assert_eq!(outcome.exchange().param("page"), Some(&json!(3)));
        assert_eq!(outcome.exchange().param("tag"), Some(&json!(["a", "b"])));
    }

    #[test]
    fn test_path_params_override_query() {
        let step = QueryValidation::new(Schema::new().field("id", Type::lax_integer()));

        let outcome = step.call(exchange("/users/5?id=9", &[("id", "5")]));
        assert_eq!(outcome.exchange().param("id"), Some(&json!(5)));
    }

    #[test]
    fn test_failure_halts_with_422_and_keeps_values() {
        let step =
            QueryValidation::new(Schema::new().field("id", Type::lax_integer().within(18..)));

        let outcome = step.call(exchange("/users/17", &[("id", "17")]));
        assert!(outcome.is_halted());

        let exchange = outcome.into_exchange();
        assert_eq!(exchange.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(exchange.errors()["id"], "Must be within 18..");
        assert_eq!(exchange.param("id"), Some(&json!(17)));
    }

    #[test]
    fn test_primary_uses_filled_cell() {
        let cell = Arc::new(OnceLock::new());
        let step = QueryValidation::primary(Schema::new(), Arc::clone(&cell));
        let _ = cell.set(Schema::new().field("q", Type::string()));

        let outcome = step.call(exchange("/search", &[]));
        assert!(outcome.is_halted());
        assert_eq!(outcome.exchange().errors()["q"], "Is required");
    }

    #[test]
    fn test_contributor_passes_through() {
        let step = QueryValidation::contributor(Schema::new().field("q", Type::string()));
        let outcome = step.call(exchange("/search", &[]));
        assert!(!outcome.is_halted());
        assert!(step.query_schema().is_some());
    }
}
