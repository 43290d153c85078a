//! Request body validation.

use sluice_core::schema::Schema;
use sluice_core::{ContentType, ErrorCategory, Exchange, Outcome};
use sluice_extract::{decode_body, ExtractionError};

use super::{Role, SchemaCell};
use crate::step::Step;

/// Resolves body fields against a schema registered for one content type.
///
/// The step only runs for requests whose Content-Type matches. A JSON schema
/// also applies to URL-encoded and multipart requests, so HTML forms can
/// post to JSON endpoints. Undecodable bodies halt with 400 and
/// `{body: <message>}`; uploaded files land in the exchange extensions as
/// [`UploadedFiles`](sluice_extract::UploadedFiles).
#[derive(Debug, Clone)]
pub struct PayloadValidation {
    content_type: ContentType,
    fragment: Schema,
    role: Role,
}

impl PayloadValidation {
    /// Validates JSON bodies against `schema`.
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self::for_content_type(ContentType::json(), schema)
    }

    /// Validates bodies of `content_type` against `schema`.
    #[must_use]
    pub fn for_content_type(content_type: ContentType, schema: Schema) -> Self {
        Self {
            content_type,
            fragment: schema,
            role: Role::Standalone,
        }
    }

    pub(crate) fn primary(content_type: ContentType, schema: Schema, cell: SchemaCell) -> Self {
        Self {
            content_type,
            fragment: schema,
            role: Role::Primary(cell),
        }
    }

    pub(crate) fn contributor(content_type: ContentType, schema: Schema) -> Self {
        Self {
            content_type,
            fragment: schema,
            role: Role::Contributor,
        }
    }

    fn applies_to(&self, request: Option<&ContentType>) -> bool {
        let Some(request) = request else {
            return false;
        };
        if self.content_type.matches(request) {
            return true;
        }
        self.content_type == ContentType::json()
            && (ContentType::form().matches(request) || ContentType::multipart().matches(request))
    }
}

impl Step for PayloadValidation {
    fn name(&self) -> &str {
        "payload-validation"
    }

    fn call(&self, exchange: Exchange) -> Outcome {
        let Some(schema) = self.role.active(&self.fragment) else {
            return exchange.proceed();
        };

        let request_type = exchange.request().content_type();
        if !self.applies_to(request_type.as_ref()) {
            return exchange.proceed();
        }

        let body = exchange.request().body();
        let decoded = match decode_body(request_type.as_ref(), body, usize::MAX) {
            Ok(decoded) => decoded,
            Err(e) => return body_error(exchange, &e),
        };

        let resolution = schema.resolve(&decoded.fields);
        let mut exchange = exchange.with_params(resolution.value);
        if !decoded.files.0.is_empty() {
            exchange = exchange.with_extension(decoded.files);
        }

        if resolution.errors.is_empty() {
            exchange.proceed()
        } else {
            tracing::debug!(errors = resolution.errors.len(), "payload validation failed");
            exchange.fail(ErrorCategory::Validation, resolution.errors)
        }
    }

    fn payload_schema(&self) -> Option<(&ContentType, &Schema)> {
        Some((&self.content_type, &self.fragment))
    }
}

fn body_error(exchange: Exchange, error: &ExtractionError) -> Outcome {
    tracing::debug!(error = %error, "request body rejected");
    exchange
        .with_error("body", error.message())
        .with_status(error.status_code())
        .halt()
}
