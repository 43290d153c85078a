//! HTTP method-based dispatch for a single path.

use http::Method;

/// Maps HTTP methods to values for one path template.
///
/// # Example
///
/// ```rust
/// use sluice_router::MethodRouter;
/// use http::Method;
///
/// let mut router = MethodRouter::new();
/// router.insert(&Method::GET, "listUsers");
/// router.insert(&Method::POST, "createUser");
///
/// assert_eq!(router.get(&Method::GET), Some(&"listUsers"));
/// assert_eq!(router.get(&Method::DELETE), None);
/// assert_eq!(router.allowed(), vec![Method::GET, Method::POST]);
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    get: Option<T>,
    post: Option<T>,
    put: Option<T>,
    delete: Option<T>,
    patch: Option<T>,
    head: Option<T>,
    options: Option<T>,
    trace: Option<T>,
    /// Extension methods, in registration order
    other: Vec<(Method, T)>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            get: None,
            post: None,
            put: None,
            delete: None,
            patch: None,
            head: None,
            options: None,
            trace: None,
            other: Vec::new(),
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates a new empty method router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut(&mut self, method: &Method) -> Option<&mut Option<T>> {
        match *method {
            Method::GET => Some(&mut self.get),
            Method::POST => Some(&mut self.post),
            Method::PUT => Some(&mut self.put),
            Method::DELETE => Some(&mut self.delete),
            Method::PATCH => Some(&mut self.patch),
            Method::HEAD => Some(&mut self.head),
            Method::OPTIONS => Some(&mut self.options),
            Method::TRACE => Some(&mut self.trace),
            _ => None,
        }
    }

    /// Registers a value for `method`.
    ///
    /// Returns the value back as `Err` when the method is already taken.
    pub fn insert(&mut self, method: &Method, value: T) -> Result<(), T> {
        if let Some(slot) = self.slot_mut(method) {
            if slot.is_some() {
                return Err(value);
            }
            *slot = Some(value);
            return Ok(());
        }

        if self.other.iter().any(|(m, _)| m == method) {
            return Err(value);
        }
        self.other.push((method.clone(), value));
        Ok(())
    }

    /// Returns the value registered for `method`.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&T> {
        match *method {
            Method::GET => self.get.as_ref(),
            Method::POST => self.post.as_ref(),
            Method::PUT => self.put.as_ref(),
            Method::DELETE => self.delete.as_ref(),
            Method::PATCH => self.patch.as_ref(),
            Method::HEAD => self.head.as_ref(),
            Method::OPTIONS => self.options.as_ref(),
            Method::TRACE => self.trace.as_ref(),
            _ => self
                .other
                .iter()
                .find(|(m, _)| m == method)
                .map(|(_, v)| v),
        }
    }

    /// Returns every method with a registered value.
    #[must_use]
    pub fn allowed(&self) -> Vec<Method> {
        let standard = [
            (Method::GET, self.get.is_some()),
            (Method::POST, self.post.is_some()),
            (Method::PUT, self.put.is_some()),
            (Method::DELETE, self.delete.is_some()),
            (Method::PATCH, self.patch.is_some()),
            (Method::HEAD, self.head.is_some()),
            (Method::OPTIONS, self.options.is_some()),
            (Method::TRACE, self.trace.is_some()),
        ];

        standard
            .into_iter()
            .filter_map(|(m, present)| present.then_some(m))
            .chain(self.other.iter().map(|(m, _)| m.clone()))
            .collect()
    }

    /// Returns true when no method is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allowed().is_empty()
    }
}
