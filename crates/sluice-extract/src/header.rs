//! Request headers as a JSON map.

use http::HeaderMap;
use serde_json::{Map, Value};

/// Collects headers under lowercase names.
///
/// A header sent more than once becomes an array. Values that are not
/// visible ASCII are skipped.
///
/// ```rust
/// use http::HeaderMap;
/// use sluice_extract::headers_to_map;
/// use serde_json::json;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("X-Request-Id", "abc".parse().unwrap());
/// headers.append("accept", "text/html".parse().unwrap());
/// headers.append("accept", "application/json".parse().unwrap());
///
/// let map = headers_to_map(&headers);
/// assert_eq!(map["x-request-id"], json!("abc"));
/// assert_eq!(map["accept"], json!(["text/html", "application/json"]));
/// ```
#[must_use]
pub fn headers_to_map(headers: &HeaderMap) -> Map<String, Value> {
    let mut map = Map::new();

    for name in headers.keys() {
        let values: Vec<Value> = headers
            .get_all(name)
            .iter()
            .filter_map(|v| match v.to_str() {
                Ok(s) => Some(Value::String(s.to_string())),
                Err(_) => {
                    tracing::debug!(header = %name, "skipping non-ASCII header value");
                    None
                }
            })
            .collect();

        let value = match values.len() {
            0 => continue,
            1 => values.into_iter().next().unwrap_or(Value::Null),
            _ => Value::Array(values),
        };
        map.insert(name.as_str().to_string(), value);
    }

    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;
    use serde_json::json;

    #[test]
    fn test_empty() {
        assert!(headers_to_map(&HeaderMap::new()).is_empty());
    }

    #[test]
    fn test_opaque_value_skipped() {
        let mut headers = HeaderMap::new();
        headers.insert("x-binary", HeaderValue::from_bytes(&[0xfa, 0xfb]).unwrap());
        headers.insert("x-plain", HeaderValue::from_static("ok"));

        let map = headers_to_map(&headers);
        assert!(!map.contains_key("x-binary"));
        assert_eq!(map["x-plain"], json!("ok"));
    }
}
