// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Per-document entry cache.
//!
//! Loading a [`CompleteEntry`] means fetching content, running extraction
//! and computing metadata, so recently used entries are kept in a bounded
//! LRU. An entry is valid only while its stored `last_modified` equals the
//! document's current one; any difference means recompute.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::types::{CacheMode, CompleteEntry};

const FALLBACK_CAPACITY: NonZeroUsize = match NonZeroUsize::new(2048) {
    Some(n) => n,
    None => NonZeroUsize::MIN,
};

/// Bounded, thread-safe LRU of complete entries keyed by document id.
pub struct EntryCache {
    entries: Mutex<LruCache<String, Arc<CompleteEntry>>>,
}

impl EntryCache {
    /// A cache holding at most `capacity` entries (a zero capacity falls back to 2048).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(FALLBACK_CAPACITY);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// The cached entry for `id`, if it was built from the version modified at `last_modified`.
    ///
    /// A stale entry is evicted.
    pub fn get(&self, id: &str, last_modified: i64) -> Option<Arc<CompleteEntry>> {
        let mut entries = self.entries.lock();
        match entries.get(id) {
            Some(entry) if entry.document.last_modified == last_modified => Some(Arc::clone(entry)),
            Some(_) => {
                entries.pop(id);
                None
            }
            None => None,
        }
    }

    /// Cache a freshly built entry. Session-only content is never retained.
    pub fn insert(&self, entry: Arc<CompleteEntry>) {
        if entry.cache_mode == CacheMode::Session {
            return;
        }
        self.entries.lock().put(entry.document.id.clone(), entry);
    }

    pub fn remove(&self, id: &str) {
        self.entries.lock().pop(id);
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl std::fmt::Debug for EntryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryCache").field("len", &self.len()).finish()
    }
}
