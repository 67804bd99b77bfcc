// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The search engine: index lifecycle, persistence and result assembly.
//!
//! ```text
//!              ┌──────────────┐  index_* / delete_*   ┌───────────────┐
//!   host ────▶ │ SearchEngine │ ────────────────────▶ │ InvertedIndex │ (RwLock)
//!              └──────┬───────┘                       └───────────────┘
//!                     │ search                                │
//!                     ▼                                       ▼
//!           rank ──▶ EntryCache (LRU) ──▶ excerpts    CacheStore ("sift-index")
//! ```
//!
//! Nothing here fails the caller. A document that cannot be loaded is
//! skipped, a cache that cannot be read is rebuilt, and a cache that cannot
//! be written is logged.

pub mod bulk;
mod provider;
mod state;

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::cache::{CacheBlob, CacheStore, EntryCache, INDEX_CACHE_KEY};
use crate::config::Settings;
use crate::excerpt::{get_groups, get_matches, make_excerpt, ExcerptOptions, MatchOptions};
use crate::index::{prepare, IndexOptions, InvertedIndex, PreparedDocument, Recency, SearchOptions};
use crate::query::Query;
use crate::scoring::ranking::{rank, RankingOptions};
use crate::tokenize::tokenize_for_search;
use crate::types::{CompleteEntry, Document, ExtractedContent, RankedHit, ResultExcerpt, ResultPage};
use crate::util::{
    escape_html, fold_for_matching, lowercase_aligned, remove_diacritics, strip_markdown_characters,
};

pub use provider::{
    extract_with_hook, ContentProvider, DocumentSource, ExtractionHook, MetadataProvider,
    ProviderError, Providers,
};
pub use state::{EngineHandle, EngineState, PendingAction};

/// Query terms this long or longer also match as prefixes. One means every term.
pub const PREFIX_MIN_LEN: usize = 1;

/// Outcome of an indexing batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexReport {
    pub indexed: usize,
    pub skipped: usize,
}

/// Build options for the index from the settings.
pub fn index_options(settings: &Settings) -> IndexOptions {
    IndexOptions {
        tokenize: settings.tokenize_options(),
        ignore_diacritics: settings.ignore_diacritics,
        ignore_arabic_diacritics: settings.ignore_arabic_diacritics,
    }
}

/// An index over one document collection, with its persistence and entry cache.
pub struct SearchEngine {
    settings: Settings,
    index: RwLock<InvertedIndex>,
    entries: EntryCache,
    providers: Providers,
    store: Arc<dyn CacheStore>,
}

impl SearchEngine {
    /// An empty engine. Call [`load_from_cache`](Self::load_from_cache) or
    /// [`full_reindex`](Self::full_reindex) to populate it.
    pub fn new(settings: Settings, providers: Providers, store: Arc<dyn CacheStore>) -> Self {
        let index = InvertedIndex::new(index_options(&settings));
        let entries = EntryCache::new(settings.entry_cache_capacity);
        Self {
            settings,
            index: RwLock::new(index),
            entries,
            providers,
            store,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Number of indexed documents.
    pub fn document_count(&self) -> usize {
        self.index.read().len()
    }

    /// Number of distinct index terms.
    pub fn term_count(&self) -> usize {
        self.index.read().term_count()
    }

    pub fn is_indexed(&self, id: &str) -> bool {
        self.index.read().has(id)
    }

    /// Parse raw query text with the configured diacritic handling.
    pub fn parse_query(&self, raw: &str) -> Query {
        Query::parse(raw, self.settings.parse_options())
    }

    // ------------------------------------------------------------------------
    // Loading documents
    // ------------------------------------------------------------------------

    /// Fetch and assemble the indexable form of `id`. `Ok(None)` when the
    /// provider has no content for it.
    fn load_document(&self, id: &str) -> Result<Option<(Document, ExtractedContent)>, ProviderError> {
        let meta = self.providers.metadata.metadata(id)?;
        let Some(extracted) = self.providers.content.content(id)? else {
            return Ok(None);
        };
        let document = Document::from_parts(id, &extracted.content, &meta);
        Ok(Some((document, extracted)))
    }

    fn prepare_one(&self, options: &IndexOptions, id: &str) -> Option<PreparedDocument> {
        if self.settings.is_excluded(id) {
            debug!(id, "excluded path, not indexing");
            return None;
        }
        match self.load_document(id) {
            Ok(Some((document, _))) => Some(prepare(options, &document)),
            Ok(None) => {
                info!(id, "no content, skipping");
                None
            }
            Err(e) => {
                info!(id, error = %e, "failed to load document, skipping");
                None
            }
        }
    }

    /// The complete entry for `id`, from the entry cache when it is still
    /// current, otherwise rebuilt from the providers.
    pub fn complete_entry(&self, id: &str) -> Option<Arc<CompleteEntry>> {
        let meta = match self.providers.metadata.metadata(id) {
            Ok(meta) => meta,
            Err(e) => {
                debug!(id, error = %e, "metadata unavailable");
                return None;
            }
        };
        if let Some(cached) = self.entries.get(id, meta.last_modified) {
            return Some(cached);
        }

        let extracted = match self.providers.content.content(id) {
            Ok(Some(extracted)) => extracted,
            Ok(None) => return None,
            Err(e) => {
                debug!(id, error = %e, "content unavailable");
                return None;
            }
        };
        let document = Document::from_parts(id, &extracted.content, &meta);
        let cleaned_content = strip_markdown_characters(&remove_diacritics(
            &document.content,
            self.settings.ignore_arabic_diacritics,
        ));
        let entry = Arc::new(CompleteEntry {
            document,
            cleaned_content,
            navigation_map: extracted.navigation_map,
            cache_mode: extracted.cache_mode,
        });
        self.entries.insert(Arc::clone(&entry));
        Some(entry)
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// Index or re-index one document. Returns whether it was indexed.
    pub fn index_one(&self, id: &str) -> bool {
        self.index_many(&[id.to_string()]).indexed == 1
    }

    /// Index or re-index several documents, then persist the index.
    ///
    /// Documents that fail to load are skipped; the rest are indexed.
    pub fn index_many(&self, ids: &[String]) -> IndexReport {
        let options = *self.index.read().options();
        let mut report = IndexReport::default();
        for id in ids {
            info!(id = %id, "indexing");
            match self.prepare_one(&options, id) {
                Some(prepared) => {
                    self.index.write().upsert(prepared);
                    self.entries.remove(id);
                    report.indexed += 1;
                }
                None => report.skipped += 1,
            }
        }
        self.persist();
        report
    }

    /// Remove one document. Missing ids are ignored.
    pub fn delete_one(&self, id: &str) -> bool {
        self.delete_many(&[id.to_string()]) == 1
    }

    /// Remove several documents, then persist the index. Returns how many were removed.
    pub fn delete_many(&self, ids: &[String]) -> usize {
        let mut removed = 0;
        {
            let mut index = self.index.write();
            for id in ids {
                if index.remove(id) {
                    removed += 1;
                } else {
                    debug!(id = %id, "not indexed, nothing to delete");
                }
                self.entries.remove(id);
            }
        }
        self.persist();
        removed
    }

    /// Rebuild the whole index from the document source, then persist it.
    pub fn full_reindex(&self) -> IndexReport {
        #[cfg(feature = "parallel")]
        {
            self.full_reindex_with_progress(&indicatif::ProgressBar::hidden())
        }
        #[cfg(not(feature = "parallel"))]
        {
            self.rebuild(|ids, options| {
                bulk::load_all(ids, self.settings.indexing_concurrency, |id| {
                    self.prepare_one(options, id)
                })
            })
        }
    }

    /// [`full_reindex`](Self::full_reindex), advancing `progress` once per document.
    #[cfg(feature = "parallel")]
    pub fn full_reindex_with_progress(&self, progress: &indicatif::ProgressBar) -> IndexReport {
        let report = self.rebuild(|ids, options| {
            bulk::load_all(ids, self.settings.indexing_concurrency, progress, |id| {
                self.prepare_one(options, id)
            })
        });
        progress.finish_with_message(format!("{} documents", report.indexed));
        report
    }

    fn rebuild<F>(&self, load: F) -> IndexReport
    where
        F: FnOnce(&[String], &IndexOptions) -> Vec<PreparedDocument>,
    {
        let ids: Vec<String> = match self.providers.source.list() {
            Ok(ids) => ids.into_iter().filter(|id| !self.settings.is_excluded(id)).collect(),
            Err(e) => {
                warn!(error = %e, "could not list documents, index left unchanged");
                return IndexReport::default();
            }
        };
        info!(count = ids.len(), "full reindex");

        let options = index_options(&self.settings);
        let prepared = load(&ids, &options);

        let mut fresh = InvertedIndex::new(options);
        let mut report = IndexReport {
            indexed: 0,
            skipped: ids.len() - prepared.len(),
        };
        for doc in prepared {
            match fresh.commit(doc) {
                Ok(()) => report.indexed += 1,
                Err(e) => {
                    warn!(error = %e, "skipping document");
                    report.skipped += 1;
                }
            }
        }

        *self.index.write() = fresh;
        self.entries.clear();
        self.persist();
        info!(indexed = report.indexed, skipped = report.skipped, "full reindex done");
        report
    }

    // ------------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------------

    /// Replace the index with the persisted one. Returns `false` (and drops
    /// the stored blob) when there is no usable cache.
    pub fn load_from_cache(&self) -> bool {
        let bytes = match self.store.get(INDEX_CACHE_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                info!("no index cache found");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "index cache unreadable");
                self.invalidate_cache();
                return false;
            }
        };

        let blob = match CacheBlob::decode(&bytes) {
            Ok(blob) if blob.schema_version.is_current() => blob,
            Ok(blob) => {
                info!(version = blob.schema_version.as_u8(), "index cache schema changed, rebuilding");
                self.invalidate_cache();
                return false;
            }
            Err(e) => {
                warn!(error = %e, "index cache corrupt, rebuilding");
                self.invalidate_cache();
                return false;
            }
        };

        match InvertedIndex::restore(&blob.serialized_index, index_options(&self.settings)) {
            Ok(index) => {
                info!(documents = index.len(), "index loaded from cache");
                *self.index.write() = index;
                self.entries.clear();
                true
            }
            Err(e) => {
                warn!(error = %e, "index cache malformed, rebuilding");
                self.invalidate_cache();
                false
            }
        }
    }

    /// Serialize the index and store it under the current schema version.
    pub fn write_to_cache(&self) -> crate::Result<()> {
        let serialized = self.index.read().serialize()?;
        let blob = CacheBlob::current(serialized).encode()?;
        self.store.set(INDEX_CACHE_KEY, &blob)?;
        Ok(())
    }

    fn persist(&self) {
        if let Err(e) = self.write_to_cache() {
            warn!(error = %e, "failed to write index cache");
        }
    }

    /// Drop the persisted index. The in-memory index is untouched.
    pub fn invalidate_cache(&self) {
        if let Err(e) = self.store.delete(INDEX_CACHE_KEY) {
            warn!(error = %e, "failed to delete index cache");
        }
    }

    // ------------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------------

    fn search_options(&self) -> SearchOptions {
        SearchOptions {
            prefix_min_len: PREFIX_MIN_LEN,
            fuzziness: self.settings.fuzziness.ratio(),
            field_boosts: self.settings.weights.boosts(),
            recency: Recency {
                cutoff: self.settings.recency_boost,
                now_ms: chrono::Utc::now().timestamp_millis(),
            },
        }
    }

    /// Ranked hits for `query`, before result assembly.
    pub fn ranked_hits(&self, query: &Query, single_document: Option<&str>) -> Vec<RankedHit> {
        if query.is_empty() {
            return Vec::new();
        }
        let tokens = tokenize_for_search(&query.segments_to_str(), &self.settings.tokenize_options());
        let hits = self.index.read().search(&tokens, &self.search_options());

        let options = RankingOptions {
            downranked_folders: &self.settings.downranked_folders_filters,
            custom_property_weights: &self.settings.weight_custom_properties,
            ignore_arabic_diacritics: self.settings.ignore_arabic_diacritics,
            single_document,
        };
        rank(query, hits, &options, |id| self.complete_entry(id))
    }

    /// Run `query` and assemble result pages with matches and excerpts.
    ///
    /// With `single_document`, only that document is returned, with one
    /// excerpt per match group.
    pub fn search(&self, query: &Query, single_document: Option<&str>) -> Vec<ResultPage> {
        self.ranked_hits(query, single_document)
            .into_iter()
            .filter_map(|hit| self.assemble(query, hit, single_document.is_some()))
            .collect()
    }

    fn assemble(&self, query: &Query, hit: RankedHit, single_document: bool) -> Option<ResultPage> {
        let Some(entry) = self.complete_entry(&hit.id) else {
            warn!(id = %hit.id, "document disappeared, skipping");
            return None;
        };

        let exact_terms = query.exact_terms();
        let mut found_words = hit.terms;
        found_words.extend(exact_terms.iter().cloned());
        found_words.extend(query.tags().into_iter().map(String::from));

        let match_options = MatchOptions {
            ignore_diacritics: self.settings.ignore_diacritics,
            ignore_arabic_diacritics: self.settings.ignore_arabic_diacritics,
        };
        let content = &entry.document.content;
        let matches = get_matches(content, &found_words, Some(query), &match_options);
        let matches_name = get_matches(&entry.document.name, &found_words, None, &match_options);

        let excerpt_options = ExcerptOptions {
            render_line_returns: self.settings.render_line_return_in_excerpts,
        };
        let excerpt_at = |offset: Option<usize>| ResultExcerpt {
            offset,
            excerpt: make_excerpt(content, offset, &excerpt_options),
        };

        let excerpts = if single_document {
            // match strings are escaped source text, so compare in that form
            let comparable = |text: &str| {
                let folded = if match_options.ignore_diacritics {
                    fold_for_matching(text, match_options.ignore_arabic_diacritics)
                } else {
                    text.to_string()
                };
                lowercase_aligned(&folded)
            };
            let needles: Vec<String> = exact_terms
                .iter()
                .map(|exact| escape_html(&comparable(exact)))
                .collect();
            get_groups(&matches)
                .into_iter()
                .filter(|group| {
                    needles.iter().all(|needle| {
                        group.iter().any(|m| comparable(&m.text).contains(needle.as_str()))
                    })
                })
                .filter_map(|group| group.first().map(|m| m.offset))
                .map(|offset| excerpt_at(Some(offset)))
                .collect()
        } else {
            vec![excerpt_at(matches.first().map(|m| m.offset))]
        };

        Some(ResultPage {
            score: hit.score,
            document: entry.document.clone(),
            found_words,
            matches,
            matches_name,
            excerpts,
            navigation_map: entry.navigation_map.clone(),
        })
    }
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("documents", &self.document_count())
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}
