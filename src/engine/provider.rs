// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The host-side collaborators the engine reads documents through.
//!
//! - [`DocumentSource`] lists every document id
//! - [`MetadataProvider`] answers "what do we know about this id"
//! - [`ContentProvider`] returns the indexable text, or `None`
//!
//! For formats the host cannot read as text, an [`ExtractionHook`] may be
//! consulted. Hooks are untrusted: errors and malformed answers both mean
//! "no content".

use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use crate::types::{CacheMode, DocumentMeta, ExtractedContent, NavigationMap};

/// Provider failures. The engine never propagates these to search callers;
/// a document that cannot be read is skipped.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("failed to read {id}: {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },

    #[error("extraction failed for {id}: {message}")]
    Extraction { id: String, message: String },
}

pub trait DocumentSource: Send + Sync {
    /// Every document id known to the host.
    fn list(&self) -> Result<Vec<String>, ProviderError>;
}

pub trait MetadataProvider: Send + Sync {
    fn metadata(&self, id: &str) -> Result<DocumentMeta, ProviderError>;
}

pub trait ContentProvider: Send + Sync {
    /// Indexable content for `id`. `Ok(None)` means there is nothing to index.
    fn content(&self, id: &str) -> Result<Option<ExtractedContent>, ProviderError>;
}

/// External extractor for non-text formats.
///
/// Every registered handler may answer, so the result is a list of raw JSON
/// values; a well-formed value is an object with a string `content` field.
pub trait ExtractionHook: Send + Sync {
    fn extract(&self, id: &str, meta: &DocumentMeta) -> Result<Vec<serde_json::Value>, ProviderError>;
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct HookResult {
    content: String,
    #[serde(default)]
    cache_mode: CacheMode,
    #[serde(default)]
    navigation_map: Option<NavigationMap>,
}

/// Ask `hook` for the content of `id`.
///
/// Errors, empty answers and malformed answers yield `None`. When several
/// handlers answer, the first answer is used.
pub fn extract_with_hook(
    hook: &dyn ExtractionHook,
    id: &str,
    meta: &DocumentMeta,
) -> Option<ExtractedContent> {
    let results = match hook.extract(id, meta) {
        Ok(results) => results,
        Err(e) => {
            warn!(id, error = %e, "extraction hook failed, discarding");
            return None;
        }
    };

    if results.len() > 1 {
        warn!(id, count = results.len(), "extraction hook returned several results, using the first");
    }
    let first = results.into_iter().next()?;

    match serde_json::from_value::<HookResult>(first) {
        Ok(result) => Some(ExtractedContent {
            content: result.content,
            cache_mode: result.cache_mode,
            navigation_map: result.navigation_map,
        }),
        Err(e) => {
            warn!(id, error = %e, "extraction hook returned a malformed result, discarding");
            None
        }
    }
}

/// The three host collaborators, shared across threads.
#[derive(Clone)]
pub struct Providers {
    pub source: Arc<dyn DocumentSource>,
    pub metadata: Arc<dyn MetadataProvider>,
    pub content: Arc<dyn ContentProvider>,
}

impl Providers {
    /// Use one value for all three roles.
    pub fn from_one<T>(provider: Arc<T>) -> Self
    where
        T: DocumentSource + MetadataProvider + ContentProvider + 'static,
    {
        Self {
            source: provider.clone(),
            metadata: provider.clone(),
            content: provider,
        }
    }
}

impl std::fmt::Debug for Providers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Providers").finish_non_exhaustive()
    }
}
