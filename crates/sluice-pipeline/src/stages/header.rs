//! Request header validation.

use sluice_core::schema::Schema;
use sluice_core::{ErrorCategory, Exchange, Outcome};
use sluice_extract::headers_to_map;

use super::{Role, SchemaCell};
use crate::step::Step;

/// Resolves request headers against a schema.
///
/// Field names are matched against lowercase header names.
#[derive(Debug, Clone)]
pub struct HeaderValidation {
    fragment: Schema,
    role: Role,
}

impl HeaderValidation {
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

impl Step for HeaderValidation {
    fn name(&self) -> &str {
        "header-validation"
    }

    fn call(&self, exchange: Exchange) -> Outcome {
        let Some(schema) = self.role.active(&self.fragment) else {
            return exchange.proceed();
        };

        let input = headers_to_map(exchange.request().headers());
        let resolution = schema.resolve(&input);
        let exchange = exchange.with_params(resolution.value);

        if resolution.errors.is_empty() {
            exchange.proceed()
        } else {
            tracing::debug!(errors = resolution.errors.len(), "header validation failed");
            exchange.fail(ErrorCategory::Validation, resolution.errors)
        }
    }

    fn header_schema(&self) -> Option<&Schema> {
        Some(&self.fragment)
    }
}
