//! Responder resolution by response status and Accept header.
//!
//! Every responder is indexed twice: under its `type/subtype` and under its
//! bare `type`. The second key lets `text/*` reach a `text/html` responder.
//!
//! ```text
//! "application/json" → StatusMap { 200 → A, 400..=499 → B }
//! "application"      → StatusMap { 200 → A, 400..=499 → B }
//! "text/html"        → StatusMap { 200 → C }
//! "text"             → StatusMap { 200 → C }
//! ```
//!
//! Resolution walks Accept candidates by descending quality. `*/*` takes the
//! first map, in registration order, that has the status. Other candidates
//! try their exact key, then their type key when the subtype is `*`. A
//! candidate whose map lacks the status falls through to the next one.

use std::sync::Arc;

use indexmap::IndexMap;
use sluice_core::{ConfigurationError, ContentType, StatusMap};

use crate::responder::Responder;

/// Content-type-indexed status maps of responders.
#[derive(Debug, Default)]
pub struct ResponderRegistry {
    maps: IndexMap<String, StatusMap<Arc<Responder>>>,
    responders: Vec<Arc<Responder>>,
}

impl ResponderRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes `responder` under its exact and type keys.
    ///
    /// Earlier registrations win where status ranges overlap.
    pub fn register(&mut self, responder: Responder) -> Result<(), ConfigurationError> {
        let responder = Arc::new(responder);
        let accepts = responder.accepts();
        let statuses = responder.statuses();

        for key in [accepts.essence(), accepts.type_key().to_string()] {
            self.maps
                .entry(key)
                .or_default()
                .insert(statuses, Arc::clone(&responder))?;
        }

        self.responders.push(responder);
        Ok(())
    }

    /// Finds the responder for `status` given a raw Accept header.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sluice_pipeline::{Responder, ResponderRegistry};
    ///
    /// let mut registry = ResponderRegistry::new();
    /// registry.register(Responder::builder(200).accepts("json").build().unwrap()).unwrap();
    /// registry.register(Responder::builder(200).accepts("html").build().unwrap()).unwrap();
    ///
    /// let responder = registry.resolve(200, "application/json;q=0.9, text/html").unwrap();
    /// assert_eq!(responder.content_type().subtype(), "html");
    /// assert!(registry.resolve(500, "*/*").is_none());
    /// ```
    #[must_use]
    pub fn resolve(&self, status: u16, accept: &str) -> Option<&Arc<Responder>> {
        for candidate in ContentType::parse_accept_header(accept) {
            if candidate.is_wildcard() {
                if let Some(found) = self.maps.values().find_map(|map| map.find(status)) {
                    return Some(found);
                }
                continue;
            }

            let map = self.maps.get(&candidate.essence()).or_else(|| {
                candidate
                    .has_wildcard_subtype()
                    .then(|| self.maps.get(candidate.type_key()))
                    .flatten()
            });

            if let Some(found) = map.and_then(|map| map.find(status)) {
                tracing::trace!(status, candidate = %candidate, "responder resolved");
                return Some(found);
            }
        }

        None
    }

    /// Registered responders in registration order.
    pub fn responders(&self) -> impl Iterator<Item = &Arc<Responder>> {
        self.responders.iter()
    }

    /// Number of registered responders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.responders.len()
    }

    /// True when nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.responders.is_empty()
    }
}
