//! Request bodies as JSON maps, dispatched on Content-Type.

use bytes::Bytes;
use serde_json::{Map, Value};
use sluice_core::ContentType;

use crate::error::{ExtractionError, ExtractionSource};
use crate::multipart::{parse_multipart, UploadedFiles};
use crate::query::parse_form;

/// Default maximum body size (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// A decoded body: named fields plus any uploaded files.
#[derive(Debug, Clone, Default)]
pub struct DecodedBody {
    /// Top-level fields
    pub fields: Map<String, Value>,
    /// File parts, only populated for multipart bodies
    pub files: UploadedFiles,
}

/// Decodes a JSON body whose top level is an object.
///
/// An empty body decodes to an empty map.
///
/// ```rust
/// use sluice_extract::parse_json_object;
/// use serde_json::json;
///
/// let map = parse_json_object(br#"{"name":"Ada","age":36}"#).unwrap();
/// assert_eq!(map["age"], json!(36));
/// assert!(parse_json_object(b"").unwrap().is_empty());
/// assert!(parse_json_object(b"[1,2]").is_err());
/// ```
pub fn parse_json_object(body: &[u8]) -> Result<Map<String, Value>, ExtractionError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ExtractionError::malformed(
            ExtractionSource::Body,
            format!("expected a JSON object, found {}", kind_of(&other)),
        )),
        Err(e) => Err(ExtractionError::malformed(ExtractionSource::Body, e)),
    }
}

/// Decodes `body` according to `content_type`.
///
/// JSON and `+json` types decode as objects, URL-encoded forms and multipart
/// bodies as flat maps. Anything else yields an empty map.
///
/// # Errors
///
/// Fails when the body exceeds `max_size` or does not decode.
pub fn decode_body(
    content_type: Option<&ContentType>,
    body: &Bytes,
    max_size: usize,
) -> Result<DecodedBody, ExtractionError> {
    if body.len() > max_size {
        return Err(ExtractionError::payload_too_large(max_size, body.len()));
    }

    let Some(content_type) = content_type else {
        return Ok(DecodedBody::default());
    };

    if is_json(content_type) {
        return Ok(DecodedBody {
            fields: parse_json_object(body)?,
            ..DecodedBody::default()
        });
    }

    if content_type.matches(&ContentType::form()) {
        return Ok(DecodedBody {
            fields: parse_form(body)?,
            ..DecodedBody::default()
        });
    }

    if content_type.matches(&ContentType::multipart()) {
        let form = parse_multipart(&content_type.to_string(), body.clone())?;
        return Ok(DecodedBody {
            fields: form.fields,
            files: form.files,
        });
    }

    tracing::debug!(content_type = %content_type, "no decoder for body content type");
    Ok(DecodedBody::default())
}

fn is_json(content_type: &ContentType) -> bool {
    content_type.kind() == "application"
        && (content_type.subtype() == "json" || content_type.subtype().ends_with("+json"))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::multipart::tests::create_multipart_body;
    use serde_json::json;

    fn ct(raw: &str) -> ContentType {
        ContentType::parse(raw).unwrap()
    }

    #[test]
    fn test_json_body() {
        let body = Bytes::from_static(br#"{"id":7,"tags":["a"]}"#);
        let decoded = decode_body(Some(&ct("application/json")), &body, 1024).unwrap();
        assert_eq!(decoded.fields["id"], json!(7));
        assert_eq!(decoded.fields["tags"], json!(["a"]));
    }

    #[test]
    fn test_vendor_json_body() {
        let body = Bytes::from_static(br#"{"id":7}"#);
        let decoded =
            decode_body(Some(&ct("application/vnd.api+json; charset=utf-8")), &body, 1024).unwrap();
        assert_eq!(decoded.fields["id"], json!(7));
    }

    #[test]
    fn test_malformed_json() {
        let body = Bytes::from_static(b"{not json");
        let err = decode_body(Some(&ct("application/json")), &body, 1024).unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
        assert!(err.message().starts_with("malformed body"));
    }

    #[test]
    fn test_json_scalar_rejected() {
        let err = parse_json_object(b"42").unwrap_err();
        assert!(err.message().contains("found a number"));
    }

    #[test]
    fn test_form_body() {
        let body = Bytes::from_static(b"name=Ada&age=36");
        let decoded =
            decode_body(Some(&ct("application/x-www-form-urlencoded")), &body, 1024).unwrap();
        assert_eq!(decoded.fields["name"], json!("Ada"));
        assert_eq!(decoded.fields["age"], json!("36"));
    }

    #[test]
    fn test_multipart_body() {
        let raw = create_multipart_body("xyz", &[("title", "text/plain", None, b"hello")]);
        let decoded = decode_body(
            Some(&ct("multipart/form-data; boundary=xyz")),
            &Bytes::from(raw),
            4096,
        )
        .unwrap();
        assert_eq!(decoded.fields["title"], json!("hello"));
        assert!(decoded.files.0.is_empty());
    }

    #[test]
    fn test_too_large() {
        let body = Bytes::from(vec![b' '; 32]);
        let err = decode_body(Some(&ct("application/json")), &body, 16).unwrap_err();
        assert_eq!(err.status_code(), http::StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_unknown_content_type_is_empty() {
        let body = Bytes::from_static(b"raw bytes");
        let decoded = decode_body(Some(&ct("application/octet-stream")), &body, 1024).unwrap();
        assert!(decoded.fields.is_empty());
        let decoded = decode_body(None, &body, 1024).unwrap();
        assert!(decoded.fields.is_empty());
    }
}
