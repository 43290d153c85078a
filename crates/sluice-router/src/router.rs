//! High-level router API.

use http::Method;

use crate::error::RouteError;
use crate::node::Node;
use crate::params::Params;
use crate::template::PathTemplate;

/// Outcome of matching a verb + path.
#[derive(Debug)]
pub enum RouteMatch<'a, T> {
    /// A value is registered for this verb and path
    Found {
        /// The registered value
        value: &'a T,
        /// Captured path parameters
        params: Params,
    },
    /// The path exists, but not for this verb
    MethodNotAllowed {
        /// Methods that are registered for the path
        allowed: Vec<Method>,
    },
    /// No template matches the path
    NotFound,
}

/// A radix tree router mapping verb + path to values.
///
/// # Example
///
/// ```rust
/// use sluice_router::{PathTemplate, RouteMatch, Router};
/// use http::Method;
///
/// let mut router = Router::new();
/// router.insert(&PathTemplate::parse("/users/:id").unwrap(), &Method::GET, "getUser").unwrap();
///
/// match router.match_route(&Method::GET, "/users/123") {
///     RouteMatch::Found { value, params } => {
///         assert_eq!(*value, "getUser");
///         assert_eq!(params.get("id"), Some("123"));
///     }
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
///
/// # Route Priority
///
/// Static segments win over `:param` segments, which win over `*wildcard`
/// segments, so `/users/me` is preferred to `/users/:id` for `/users/me`.
#[derive(Debug, Clone)]
pub struct Router<T> {
    root: Node<T>,
    route_count: usize,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Router<T> {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::root(),
            route_count: 0,
        }
    }

    /// Registers `value` under `method` + `template`.
    ///
    /// # Errors
    ///
    /// Fails when the pair is already registered or the template captures a
    /// position under a different name than an existing template.
    pub fn insert(
        &mut self,
        template: &PathTemplate,
        method: &Method,
        value: T,
    ) -> Result<(), RouteError> {
        self.root.insert(template, method, value)?;
        self.route_count += 1;
        Ok(())
    }

    /// Matches a verb and concrete path.
    #[must_use]
    pub fn match_route(&self, method: &Method, path: &str) -> RouteMatch<'_, T> {
        let Some((methods, params)) = self.root.match_path(path) else {
            return RouteMatch::NotFound;
        };

        match methods.get(method) {
            Some(value) => RouteMatch::Found { value, params },
            None => RouteMatch::MethodNotAllowed {
                allowed: methods.allowed(),
            },
        }
    }

    /// Returns the number of registered verb + path pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.route_count
    }

    /// Returns true if no routes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.route_count == 0
    }
}
