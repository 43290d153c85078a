//! Path templates.
//!
//! A template is a `/`-separated pattern where `:name` captures one segment
//! and `*name` captures the remainder of the path:
//!
//! ```text
//! /users/:id            -> tokens ["id"]
//! /orgs/:org/files/*key -> tokens ["org", "key"]
//! ```

use std::fmt;

use crate::error::RouteError;
use crate::params::Params;

/// One parsed segment of a [`PathTemplate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Literal segment (e.g. `users`)
    Static(String),
    /// Named single-segment capture (e.g. `:id`)
    Param(String),
    /// Named catch-all capture, always last (e.g. `*path`)
    Wildcard(String),
}

impl Segment {
    /// Returns the capture name, if this segment captures anything.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Static(_) => None,
            Self::Param(name) | Self::Wildcard(name) => Some(name),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(s) => f.write_str(s),
            Self::Param(name) => write!(f, ":{name}"),
            Self::Wildcard(name) => write!(f, "*{name}"),
        }
    }
}

/// A parsed path pattern such as `/users/:id`.
///
/// # Example
///
/// ```rust
/// use sluice_router::PathTemplate;
///
/// let template = PathTemplate::parse("/users/:id/posts/:post_id").unwrap();
/// assert_eq!(template.tokens().collect::<Vec<_>>(), vec!["id", "post_id"]);
///
/// let params = template.capture("/users/7/posts/99").unwrap();
/// assert_eq!(params.get("post_id"), Some("99"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Parses a template string.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidTemplate`] when a capture has no name,
    /// a capture name repeats, or a wildcard is not the final segment.
    pub fn parse(raw: impl Into<String>) -> Result<Self, RouteError> {
        let raw = raw.into();
        let invalid = |reason: &str| RouteError::InvalidTemplate {
            path: raw.clone(),
            reason: reason.to_string(),
        };

        if !raw.starts_with('/') {
            return Err(invalid("must start with '/'"));
        }

        let mut segments = Vec::new();
        for part in raw.split('/').filter(|s| !s.is_empty()) {
            if matches!(segments.last(), Some(Segment::Wildcard(_))) {
                return Err(invalid("wildcard must be the last segment"));
            }

            let segment = if let Some(name) = part.strip_prefix(':') {
                Segment::Param(name.to_string())
            } else if let Some(name) = part.strip_prefix('*') {
                Segment::Wildcard(name.to_string())
            } else {
                Segment::Static(part.to_string())
            };

            if let Some(name) = segment.token() {
                if !is_identifier(name) {
                    return Err(invalid("capture names must be identifiers"));
                }
                if segments.iter().any(|s: &Segment| s.token() == Some(name)) {
                    return Err(invalid("capture names must be unique"));
                }
            }
            segments.push(segment);
        }

        Ok(Self { raw, segments })
    }

    /// Returns the template exactly as it was written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the capture names in declaration order.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::token)
    }

    /// Returns true when `name` is one of the template's captures.
    #[must_use]
    pub fn has_token(&self, name: &str) -> bool {
        self.tokens().any(|t| t == name)
    }

    /// Matches a concrete path against this template alone.
    ///
    /// Routing across many templates goes through [`Router`](crate::Router);
    /// this is for callers that already know which template applies.
    #[must_use]
    pub fn capture(&self, path: &str) -> Option<Params> {
        let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Static(s) => {
                    if parts.get(i) != Some(&s.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => params.push(name.as_str(), *parts.get(i)?),
                Segment::Wildcard(name) => {
                    params.push(name.as_str(), parts[i.min(parts.len())..].join("/"));
                    return Some(params);
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_static() {
        let t = PathTemplate::parse("/health").unwrap();
        assert_eq!(t.segments(), &[Segment::Static("health".into())]);
        assert_eq!(t.tokens().count(), 0);
    }

    #[test]
    fn test_parse_params_and_wildcard() {
        let t = PathTemplate::parse("/orgs/:org/files/*key").unwrap();
        assert_eq!(t.tokens().collect::<Vec<_>>(), vec!["org", "key"]);
        assert!(t.has_token("org"));
        assert!(!t.has_token("files"));
        assert_eq!(t.to_string(), "/orgs/:org/files/*key");
    }

    #[test]
    fn test_parse_root() {
        let t = PathTemplate::parse("/").unwrap();
        assert!(t.segments().is_empty());
        assert!(t.capture("/").is_some());
    }

    #[test]
    fn test_reject_relative() {
        assert!(PathTemplate::parse("users/:id").is_err());
    }

    #[test]
    fn test_reject_wildcard_not_last() {
        let err = PathTemplate::parse("/files/*path/meta").unwrap_err();
        assert!(err.to_string().contains("wildcard"));
    }

    #[test]
    fn test_reject_duplicate_tokens() {
        assert!(PathTemplate::parse("/a/:id/b/:id").is_err());
    }

    #[test]
    fn test_reject_empty_token() {
        assert!(PathTemplate::parse("/users/:").is_err());
        assert!(PathTemplate::parse("/users/:1abc").is_err());
    }

    #[test]
    fn test_capture() {
        let t = PathTemplate::parse("/users/:id").unwrap();
        let params = t.capture("/users/17").unwrap();
        assert_eq!(params.get("id"), Some("17"));

        assert!(t.capture("/users").is_none());
        assert!(t.capture("/users/17/extra").is_none());
        assert!(t.capture("/people/17").is_none());
    }

    #[test]
    fn test_capture_wildcard() {
        let t = PathTemplate::parse("/files/*path").unwrap();
        let params = t.capture("/files/a/b/c.txt").unwrap();
        assert_eq!(params.get("path"), Some("a/b/c.txt"));

        let params = t.capture("/files").unwrap();
        assert_eq!(params.get("path"), Some(""));
    }
}
