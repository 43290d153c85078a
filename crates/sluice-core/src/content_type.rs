//! MIME types and `Accept` header parsing.
//!
//! A [`ContentType`] is `type/subtype` plus ordered `key=value` parameters.
//! The `q` parameter, when present, is exposed as [`ContentType::quality`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::FormatError;

/// Short names accepted in place of a full MIME string.
const SHORTHANDS: &[(&str, &str)] = &[
    ("json", "application/json"),
    ("xml", "application/xml"),
    ("html", "text/html"),
    ("text", "text/plain"),
    ("plain", "text/plain"),
    ("csv", "text/csv"),
    ("form", "application/x-www-form-urlencoded"),
    ("multipart", "multipart/form-data"),
    ("any", "*/*"),
];

/// The `*` token used for wildcard types and subtypes.
pub const WILDCARD: &str = "*";

/// A parsed MIME type.
///
/// # Example
///
/// ```
/// use sluice_core::ContentType;
///
/// let ct = ContentType::parse("application/json; charset=utf-8; q=0.5").unwrap();
/// assert_eq!(ct.kind(), "application");
/// assert_eq!(ct.subtype(), "json");
/// assert_eq!(ct.param("charset"), Some("utf-8"));
/// assert!((ct.quality() - 0.5).abs() < f32::EPSILON);
///
/// assert_eq!(ContentType::parse(":json").unwrap(), ContentType::json());
/// ```
#[derive(Debug, Clone)]
pub struct ContentType {
    kind: String,
    subtype: String,
    params: Vec<(String, String)>,
    quality: f32,
}

impl ContentType {
    /// Parses a MIME string or a shorthand such as `json` / `:html`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError`] when the input is not `type/subtype`, a
    /// parameter lacks `=`, or `q` is not a number in `0..=1`.
    pub fn parse(input: &str) -> Result<Self, FormatError> {
        let trimmed = input.trim();
        let name = trimmed.strip_prefix(':').unwrap_or(trimmed);

        if !name.contains('/') {
            return match SHORTHANDS.iter().find(|(short, _)| short.eq_ignore_ascii_case(name)) {
                Some((_, full)) => Self::parse(full),
                None => Err(FormatError::new(input, "expected type/subtype")),
            };
        }

        let mut parts = split_unquoted(name, ';').into_iter();
        let essence = parts.next().unwrap_or_default();
        let (kind, subtype) = essence
            .split_once('/')
            .ok_or_else(|| FormatError::new(input, "expected type/subtype"))?;
        let (kind, subtype) = (kind.trim(), subtype.trim());

        if !is_token(kind) || !is_token(subtype) {
            return Err(FormatError::new(input, "type and subtype must be tokens"));
        }
        if kind == WILDCARD && subtype != WILDCARD {
            return Err(FormatError::new(input, "wildcard type requires wildcard subtype"));
        }

        let mut params = Vec::new();
        for raw in parts {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            let (key, value) = raw
                .split_once('=')
                .ok_or_else(|| FormatError::new(input, "parameter without '='"))?;
            let key = key.trim();
            if !is_token(key) {
                return Err(FormatError::new(input, "parameter name must be a token"));
            }
            let value = unquote(value.trim())
                .ok_or_else(|| FormatError::new(input, "unterminated quoted parameter"))?;
            params.push((key.to_ascii_lowercase(), value));
        }

        let quality = match params.iter().find(|(k, _)| k == "q") {
            Some((_, q)) => q
                .parse::<f32>()
                .ok()
                .filter(|q| (0.0..=1.0).contains(q))
                .ok_or_else(|| FormatError::new(input, "quality must be a number in 0..=1"))?,
            None => 1.0,
        };

        Ok(Self {
            kind: kind.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            params,
            quality,
        })
    }

    /// Parses an `Accept` header into candidates, highest quality first.
    ///
    /// Entries with equal quality keep their header order. Malformed entries
    /// are skipped; an empty header, or one with no valid entries, yields a
    /// single `*/*` candidate.
    ///
    /// ```
    /// use sluice_core::ContentType;
    ///
    /// let list = ContentType::parse_accept_header("text/html;q=0.7, application/json");
    /// assert_eq!(list[0].subtype(), "json");
    /// assert_eq!(list[1].subtype(), "html");
    /// ```
    #[must_use]
    pub fn parse_accept_header(header: &str) -> Vec<Self> {
        let mut candidates: Vec<Self> = split_unquoted(header, ',')
            .into_iter()
            .filter(|entry| !entry.trim().is_empty())
            .filter_map(|entry| match Self::parse(entry) {
                Ok(ct) => Some(ct),
                Err(e) => {
                    tracing::debug!(error = %e, "skipping malformed accept entry");
                    None
                }
            })
            .collect();

        if candidates.is_empty() {
            return vec![Self::any()];
        }

        // sort_by is stable, so equal qualities keep header order
        candidates.sort_by(|a, b| b.quality.total_cmp(&a.quality));
        candidates
    }

    fn from_static(kind: &str, subtype: &str) -> Self {
        Self {
            kind: kind.to_string(),
            subtype: subtype.to_string(),
            params: Vec::new(),
            quality: 1.0,
        }
    }

    /// `application/json`
    #[must_use]
    pub fn json() -> Self {
        Self::from_static("application", "json")
    }

    /// `text/html`
    #[must_use]
    pub fn html() -> Self {
        Self::from_static("text", "html")
    }

    /// `text/plain`
    #[must_use]
    pub fn plain() -> Self {
        Self::from_static("text", "plain")
    }

    /// `application/x-www-form-urlencoded`
    #[must_use]
    pub fn form() -> Self {
        Self::from_static("application", "x-www-form-urlencoded")
    }

    /// `multipart/form-data`
    #[must_use]
    pub fn multipart() -> Self {
        Self::from_static("multipart", "form-data")
    }

    /// `*/*`
    #[must_use]
    pub fn any() -> Self {
        Self::from_static(WILDCARD, WILDCARD)
    }

    /// The top-level type, e.g. `application`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The subtype, e.g. `json`.
    #[must_use]
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// Parameters in the order they were written, keys lowercased.
    #[must_use]
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Looks up a parameter by (lowercase) name.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `q` parameter, 1.0 when absent.
    #[must_use]
    pub fn quality(&self) -> f32 {
        self.quality
    }

    /// Registry key for the type alone, e.g. `application`.
    #[must_use]
    pub fn type_key(&self) -> &str {
        &self.kind
    }

    /// Registry key for `type/subtype` without parameters.
    #[must_use]
    pub fn essence(&self) -> String {
        format!("{}/{}", self.kind, self.subtype)
    }

    /// True for `*/*`.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.kind == WILDCARD && self.subtype == WILDCARD
    }

    /// True when the subtype is `*` (including `*/*`).
    #[must_use]
    pub fn has_wildcard_subtype(&self) -> bool {
        self.subtype == WILDCARD
    }

    /// True when this pattern accepts `other`, ignoring parameters.
    ///
    /// ```
    /// use sluice_core::ContentType;
    ///
    /// let pattern = ContentType::parse("text/*").unwrap();
    /// assert!(pattern.matches(&ContentType::html()));
    /// assert!(!pattern.matches(&ContentType::json()));
    /// ```
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        (self.kind == WILDCARD || self.kind == other.kind)
            && (self.subtype == WILDCARD || self.subtype == other.subtype)
    }

    fn sorted_params(&self) -> Vec<&(String, String)> {
        let mut params: Vec<_> = self.params.iter().collect();
        params.sort();
        params
    }
}

impl PartialEq for ContentType {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
            && self.subtype == other.subtype
            && self.sorted_params() == other.sorted_params()
    }
}

impl Eq for ContentType {}

impl Hash for ContentType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.subtype.hash(state);
        self.sorted_params().hash(state);
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.subtype)?;
        for (key, value) in &self.params {
            if is_token(value) {
                write!(f, "; {key}={value}")?;
            } else {
                let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "; {key}=\"{escaped}\"")?;
            }
        }
        Ok(())
    }
}

impl FromStr for ContentType {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for ContentType {
    type Error = FormatError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl Serialize for ContentType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}

/// Splits on `sep` outside double-quoted strings.
fn split_unquoted(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quoted = false;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if quoted => escaped = true,
            '"' => quoted = !quoted,
            c if c == sep && !quoted => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}

fn unquote(value: &str) -> Option<String> {
    let Some(inner) = value.strip_prefix('"') else {
        return Some(value.to_string());
    };
    let inner = inner.strip_suffix('"')?;

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            out.push(chars.next()?);
        } else {
            out.push(c);
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let ct = ContentType::parse("application/json").unwrap();
        assert_eq!(ct.essence(), "application/json");
        assert!(ct.params().is_empty());
        assert!((ct.quality() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_quality() {
        let ct = ContentType::parse("application/json; q=0.5").unwrap();
        assert!((ct.quality() - 0.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_parse_quoted_param() {
        let ct = ContentType::parse(r#"text/plain; note="a; b \"c\"""#).unwrap();
        assert_eq!(ct.param("note"), Some(r#"a; b "c""#));
    }

    #[test]
    fn test_parse_case_insensitive() {
        let ct = ContentType::parse("Application/JSON; Charset=UTF-8").unwrap();
        assert_eq!(ct.essence(), "application/json");
        assert_eq!(ct.param("charset"), Some("UTF-8"));
    }

    #[test]
    fn test_shorthands() {
        assert_eq!(ContentType::parse("json").unwrap(), ContentType::json());
        assert_eq!(ContentType::parse(":html").unwrap(), ContentType::html());
        assert_eq!(ContentType::parse("form").unwrap(), ContentType::form());
        assert!(ContentType::parse("any").unwrap().is_wildcard());
    }

    #[test]
    fn test_format_errors() {
        assert!(ContentType::parse("").is_err());
        assert!(ContentType::parse("nonsense").is_err());
        assert!(ContentType::parse("application/").is_err());
        assert!(ContentType::parse("/json").is_err());
        assert!(ContentType::parse("*/json").is_err());
        assert!(ContentType::parse("application/json; charset").is_err());
        assert!(ContentType::parse("application/json; q=high").is_err());
        assert!(ContentType::parse("application/json; q=1.5").is_err());
        assert!(ContentType::parse(r#"text/plain; a="open"#).is_err());
    }

    #[test]
    fn test_equality_ignores_param_order() {
        let a = ContentType::parse("text/plain; a=1; b=2").unwrap();
        let b = ContentType::parse("text/plain; b=2; a=1").unwrap();
        assert_eq!(a, b);

        let mut set = std::collections::HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_equality_considers_params() {
        let a = ContentType::parse("text/plain; charset=utf-8").unwrap();
        assert_ne!(a, ContentType::plain());
    }

    #[test]
    fn test_display_round_trip() {
        let ct = ContentType::parse(r#"application/json; version="1.0 beta"; q=0.8"#).unwrap();
        let rendered = ct.to_string();
        assert_eq!(rendered, r#"application/json; version="1.0 beta"; q=0.8"#);
        assert_eq!(ContentType::parse(&rendered).unwrap(), ct);
    }

    #[test]
    fn test_accept_header_sort_order() {
        let list = ContentType::parse_accept_header(
            "text/html;q=0.7, application/xhtml+xml, application/xml;q=0.9, */*;q=0.6",
        );
        let essences: Vec<_> = list.iter().map(ContentType::essence).collect();
        assert_eq!(
            essences,
            vec!["application/xhtml+xml", "application/xml", "text/html", "*/*"]
        );
    }

    #[test]
    fn test_accept_header_stable_ties() {
        let list = ContentType::parse_accept_header("text/csv;q=0.5, text/html, application/json");
        let essences: Vec<_> = list.iter().map(ContentType::essence).collect();
        assert_eq!(essences, vec!["text/html", "application/json", "text/csv"]);
    }

    #[test]
    fn test_accept_header_skips_malformed() {
        let list = ContentType::parse_accept_header("garbage, text/html;q=0.2");
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].essence(), "text/html");
    }

    #[test]
    fn test_accept_header_empty_is_wildcard() {
        let list = ContentType::parse_accept_header("  ");
        assert_eq!(list.len(), 1);
        assert!(list[0].is_wildcard());
    }

    #[test]
    fn test_matches() {
        let any = ContentType::any();
        assert!(any.matches(&ContentType::json()));
        let utf8 = ContentType::parse("application/json; charset=utf-8").unwrap();
        assert!(ContentType::json().matches(&utf8));
        assert!(!ContentType::json().matches(&ContentType::html()));
    }

    #[test]
    fn test_serialize_as_string() {
        let json = serde_json::to_string(&ContentType::json()).unwrap();
        assert_eq!(json, "\"application/json\"");
    }
}
