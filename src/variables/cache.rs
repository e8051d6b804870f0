//! Store of the last captured result of each named request.
//!
//! Request variables resolve against the most recent request/response pair
//! captured for a `(name, document)` key. The store is written by whatever
//! executes requests and only read by diagnostics.

use crate::models::{HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::sync::Arc;
use url::Url;

/// Identifies a request variable: the `@name` of a request within a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestVariableCacheKey {
    pub name: String,
    pub document: Url,
}

impl RequestVariableCacheKey {
    pub fn new(name: impl Into<String>, document: Url) -> Self {
        Self {
            name: name.into(),
            document,
        }
    }
}

/// The request and response captured the last time a named request ran.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestVariableCacheValue {
    pub request: HttpRequest,
    pub response: HttpResponse,
    pub captured_at: DateTime<Utc>,
}

impl RequestVariableCacheValue {
    pub fn new(request: HttpRequest, response: HttpResponse) -> Self {
        Self {
            request,
            response,
            captured_at: Utc::now(),
        }
    }
}

/// Read access to captured request results.
///
/// Reads may observe a newer or older snapshot than a previous read; no
/// consistency is assumed across calls.
pub trait RequestVariableCache: Send + Sync {
    fn get(&self, key: &RequestVariableCacheKey) -> Option<Arc<RequestVariableCacheValue>>;

    fn has(&self, key: &RequestVariableCacheKey) -> bool {
        self.get(key).is_some()
    }
}

/// Concurrent in-memory cache backed by `DashMap`.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRequestCache {
    entries: Arc<DashMap<RequestVariableCacheKey, Arc<RequestVariableCacheValue>>>,
}

impl InMemoryRequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores the latest result for `key`, replacing any previous one.
    pub fn insert(&self, key: RequestVariableCacheKey, value: RequestVariableCacheValue) {
        log::debug!("Caching result of request '{}' in {}", key.name, key.document);
        self.entries.insert(key, Arc::new(value));
    }

    pub fn remove(&self, key: &RequestVariableCacheKey) -> Option<Arc<RequestVariableCacheValue>> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    /// Drops every entry captured for `document`.
    pub fn remove_document(&self, document: &Url) {
        self.entries.retain(|key, _| &key.document != document);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RequestVariableCache for InMemoryRequestCache {
    fn get(&self, key: &RequestVariableCacheKey) -> Option<Arc<RequestVariableCacheValue>> {
        self.entries.get(key).map(|entry| Arc::clone(entry.value()))
    }
}
