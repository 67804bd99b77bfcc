//! Test utilities shared across unit and integration tests.
//!
//! This module is always compiled but hidden from documentation.
//! It provides an in-memory document space and canonical helpers so tests
//! don't each grow their own.

#![doc(hidden)]

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::cache::MemoryStore;
use crate::config::Settings;
use crate::engine::{
    ContentProvider, DocumentSource, MetadataProvider, ProviderError, Providers, SearchEngine,
};
use crate::types::{Document, DocumentMeta, ExtractedContent};

#[derive(Debug, Clone)]
enum Slot {
    Readable {
        meta: DocumentMeta,
        content: ExtractedContent,
    },
    Unreadable,
}

/// An in-memory document space implementing all three provider traits.
#[derive(Debug, Default)]
pub struct MemorySpace {
    docs: RwLock<BTreeMap<String, Slot>>,
}

impl MemorySpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a document with default metadata.
    pub fn put(&self, id: &str, content: &str) {
        self.put_with_meta(id, content, DocumentMeta::default());
    }

    pub fn put_with_mtime(&self, id: &str, content: &str, last_modified: i64) {
        let meta = DocumentMeta {
            last_modified,
            ..DocumentMeta::default()
        };
        self.put_with_meta(id, content, meta);
    }

    pub fn put_with_meta(&self, id: &str, content: &str, meta: DocumentMeta) {
        self.put_extracted(id, ExtractedContent::persistent(content), meta);
    }

    pub fn put_extracted(&self, id: &str, content: ExtractedContent, meta: DocumentMeta) {
        self.docs
            .write()
            .insert(id.to_string(), Slot::Readable { meta, content });
    }

    /// A listed document whose metadata cannot be read.
    pub fn put_unreadable(&self, id: &str) {
        self.docs.write().insert(id.to_string(), Slot::Unreadable);
    }

    pub fn remove(&self, id: &str) {
        self.docs.write().remove(id);
    }

    fn slot(&self, id: &str) -> Result<(DocumentMeta, ExtractedContent), ProviderError> {
        match self.docs.read().get(id) {
            Some(Slot::Readable { meta, content }) => Ok((meta.clone(), content.clone())),
            Some(Slot::Unreadable) => Err(ProviderError::Io {
                id: id.to_string(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "unreadable"),
            }),
            None => Err(ProviderError::NotFound(id.to_string())),
        }
    }
}

impl DocumentSource for MemorySpace {
    fn list(&self) -> Result<Vec<String>, ProviderError> {
        Ok(self.docs.read().keys().cloned().collect())
    }
}

impl MetadataProvider for MemorySpace {
    fn metadata(&self, id: &str) -> Result<DocumentMeta, ProviderError> {
        self.slot(id).map(|(meta, _)| meta)
    }
}

impl ContentProvider for MemorySpace {
    fn content(&self, id: &str) -> Result<Option<ExtractedContent>, ProviderError> {
        self.slot(id).map(|(_, content)| Some(content))
    }
}

/// A document with default metadata.
pub fn make_doc(id: &str, content: &str) -> Document {
    Document::from_parts(id, content, &DocumentMeta::default())
}

/// An engine over `space` with an in-memory cache store, fully indexed.
pub fn indexed_engine(settings: Settings, space: &Arc<MemorySpace>) -> SearchEngine {
    let engine = SearchEngine::new(
        settings,
        Providers::from_one(Arc::clone(space)),
        Arc::new(MemoryStore::new()),
    );
    engine.full_reindex();
    engine
}

/// An engine over a fresh space holding `docs`, fully indexed.
pub fn engine_with(settings: Settings, docs: &[(&str, &str)]) -> (SearchEngine, Arc<MemorySpace>) {
    let space = Arc::new(MemorySpace::new());
    for (id, content) in docs {
        space.put(id, content);
    }
    (indexed_engine(settings, &space), space)
}
