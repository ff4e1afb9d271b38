//! Filtered response bodies keyed by request path and year.
//! Never holds unfiltered responses; those come straight from the dataset.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPayload {
    pub body: Bytes,
    pub count: usize,
}

#[derive(Debug, Default)]
pub struct FilteredResponseCache {
    buckets: Mutex<HashMap<String, HashMap<i32, CachedPayload>>>,
}

impl FilteredResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str, year: i32) -> Option<CachedPayload> {
        self.lock().get(path)?.get(&year).cloned()
    }

    /// First writer wins; returns whatever ends up stored so concurrent
    /// computations of the same key hand out identical bodies.
    pub fn insert(&self, path: &str, year: i32, payload: CachedPayload) -> CachedPayload {
        let mut buckets = self.lock();
        buckets
            .entry(path.to_string())
            .or_default()
            .entry(year)
            .or_insert(payload)
            .clone()
    }

    /// Total cached (path, year) entries.
    pub fn len(&self) -> usize {
        self.lock().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, HashMap<i32, CachedPayload>>> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
