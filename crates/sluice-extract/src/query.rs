//! Query strings and URL-encoded forms as JSON maps.
//!
//! Values stay strings; schema resolution does any coercion. A repeated key,
//! or a key written as `name[]`, collects its values into an array.

use serde_json::{Map, Value};

use crate::error::{ExtractionError, ExtractionSource};

/// Decodes a query string.
///
/// ```rust
/// use sluice_extract::parse_query;
/// use serde_json::json;
///
/// let map = parse_query(Some("page=2&tag=a&tag=b&ids[]=7")).unwrap();
/// assert_eq!(map["page"], json!("2"));
/// assert_eq!(map["tag"], json!(["a", "b"]));
/// assert_eq!(map["ids"], json!(["7"]));
/// ```
pub fn parse_query(raw: Option<&str>) -> Result<Map<String, Value>, ExtractionError> {
    parse_urlencoded(raw.unwrap_or_default(), ExtractionSource::Query)
}

/// Decodes an `application/x-www-form-urlencoded` body.
pub fn parse_form(body: &[u8]) -> Result<Map<String, Value>, ExtractionError> {
    let text = std::str::from_utf8(body)
        .map_err(|e| ExtractionError::malformed(ExtractionSource::Body, e))?;
    parse_urlencoded(text, ExtractionSource::Body)
}

fn parse_urlencoded(
    raw: &str,
    source: ExtractionSource,
) -> Result<Map<String, Value>, ExtractionError> {
    let pairs: Vec<(String, String)> =
        serde_urlencoded::from_str(raw).map_err(|e| ExtractionError::malformed(source, e))?;
    Ok(collect_pairs(pairs))
}

/// Folds `(key, value)` pairs into a map, arraying repeated and `[]` keys.
pub(crate) fn collect_pairs(
    pairs: impl IntoIterator<Item = (String, String)>,
) -> Map<String, Value> {
    let mut map = Map::new();

    for (key, value) in pairs {
        let (key, forced_array) = match key.strip_suffix("[]") {
            Some(stripped) => (stripped.to_string(), true),
            None => (key, false),
        };
        let value = Value::String(value);

        match map.get_mut(&key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None if forced_array => {
                map.insert(key, Value::Array(vec![value]));
            }
            None => {
                map.insert(key, value);
            }
        }
    }

    map
}
