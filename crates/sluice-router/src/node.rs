//! Radix tree node implementation.
//!
//! Each node is one path segment. Static children are kept sorted so lookup
//! can binary search them; a node has at most one parameter child and one
//! wildcard child.

use http::Method;

use crate::error::RouteError;
use crate::method_router::MethodRouter;
use crate::params::Params;
use crate::template::{PathTemplate, Segment};

/// A node in the radix tree.
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// The segment this node represents
    segment: Segment,

    /// Values keyed by method, present when a template ends here
    methods: Option<MethodRouter<T>>,

    /// Static children, sorted by segment for binary search
    static_children: Vec<Node<T>>,

    /// Parameter child (at most one per node)
    param_child: Option<Box<Node<T>>>,

    /// Wildcard child (at most one per node, always a leaf)
    wildcard_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn new(segment: Segment) -> Self {
        Self {
            segment,
            methods: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::new(Segment::Static(String::new()))
    }

    /// Inserts `value` for `method` at the position described by `template`.
    pub fn insert(
        &mut self,
        template: &PathTemplate,
        method: &Method,
        value: T,
    ) -> Result<(), RouteError> {
        let leaf = self.descend(template, template.segments())?;
        let methods = leaf.methods.get_or_insert_with(MethodRouter::new);

        methods.insert(method, value).map_err(|_| RouteError::Duplicate {
            method: method.to_string(),
            path: template.to_string(),
        })
    }

    /// Walks (creating as needed) to the node for `segments`.
    fn descend(
        &mut self,
        template: &PathTemplate,
        segments: &[Segment],
    ) -> Result<&mut Self, RouteError> {
        let Some((segment, remaining)) = segments.split_first() else {
            return Ok(self);
        };

        let child = match segment {
            Segment::Static(name) => {
                let index = match self.find_static_index(name) {
                    Ok(i) => i,
                    Err(i) => {
                        self.static_children.insert(i, Node::new(segment.clone()));
                        i
                    }
                };
                &mut self.static_children[index]
            }
            Segment::Param(name) | Segment::Wildcard(name) => {
                let slot = if matches!(segment, Segment::Param(_)) {
                    &mut self.param_child
                } else {
                    &mut self.wildcard_child
                };
                let child = slot.get_or_insert_with(|| Box::new(Node::new(segment.clone())));

                if child.segment.token() != Some(name.as_str()) {
                    return Err(RouteError::ConflictingCapture {
                        path: template.to_string(),
                        existing: child.segment.token().unwrap_or_default().to_string(),
                    });
                }
                child.as_mut()
            }
        };

        child.descend(template, remaining)
    }

    /// Matches a concrete path, returning the method table and captures.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();
        let methods = self.match_segments(&segments, &mut params)?;
        Some((methods, params))
    }

    fn match_segments(&self, segments: &[&str], params: &mut Params) -> Option<&MethodRouter<T>> {
        let Some((segment, remaining)) = segments.split_first() else {
            if let Some(methods) = &self.methods {
                return Some(methods);
            }
            // A trailing wildcard also matches an empty remainder
            let child = self.wildcard_child.as_ref()?;
            if let Some(name) = child.segment.token() {
                params.push(name, "");
            }
            return child.methods.as_ref();
        };

        // Static beats parameter beats wildcard
        if let Ok(i) = self.find_static_index(segment) {
            if let Some(found) = self.static_children[i].match_segments(remaining, params) {
                return Some(found);
            }
        }

        if let Some(child) = &self.param_child {
            let mark = params.len();
            if let Some(name) = child.segment.token() {
                params.push(name, *segment);
            }
            if let Some(found) = child.match_segments(remaining, params) {
                return Some(found);
            }
            params.truncate(mark);
        }

        let child = self.wildcard_child.as_ref()?;
        if let Some(name) = child.segment.token() {
            params.push(name, segments.join("/"));
        }
        child.methods.as_ref()
    }

    fn find_static_index(&self, name: &str) -> Result<usize, usize> {
        self.static_children.binary_search_by(|c| match &c.segment {
            Segment::Static(s) => s.as_str().cmp(name),
            _ => std::cmp::Ordering::Less,
        })
    }
}
