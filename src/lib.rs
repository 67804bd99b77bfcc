//! Embeddable full-text search for personal note collections.
//!
//! Give it a collection of documents and free-form query text; get back
//! ranked results with highlighted excerpts. Matching is lexical: tokens,
//! prefixes and typo-tolerant fuzzy terms, never embeddings.
//!
//! # Architecture
//!
//! ```text
//!  raw query ──▶ query::Query ──▶ tokenize (search mode) ──▶ index::InvertedIndex
//!                    │                                             │ BM25+ hits
//!                    │                                             ▼
//!                    └──────────────▶ scoring::ranking ◀── engine::SearchEngine
//!                                        │ filters, boosts, top 50       │
//!                                        ▼                               │
//!                              excerpt (matches, groups,                 │
//!                              windows, highlights) ──▶ ResultPage       │
//!                                                                        ▼
//!                                  cache (blob codec, stores, entry LRU)
//! ```
//!
//! # Modules
//!
//! | Module     | Role                                                        |
//! |------------|-------------------------------------------------------------|
//! | `util`     | Diacritic folding, markdown emphasis, HTML escaping         |
//! | `tokenize` | Index-time token sets and search-time OR-of-AND groups      |
//! | `query`    | Query language: quotes, exclusions, `ext:` and `path:`      |
//! | `fuzzy`    | Bounded Levenshtein distance                                |
//! | `index`    | Field-weighted inverted index with prefix/fuzzy expansion   |
//! | `scoring`  | BM25+, recency, and the ranking pipeline                    |
//! | `excerpt`  | Match offsets, excerpt windows, highlighting                |
//! | `cache`    | Versioned cache blobs, stores, per-document entry cache     |
//! | `config`   | Typed, validated settings                                   |
//! | `engine`   | The search engine, providers, lifecycle handle              |
//! | `vault`    | A directory of notes as a provider                          |
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use sift::{EngineHandle, FileStore, Providers, SearchEngine, Settings, Vault};
//!
//! let vault = Arc::new(Vault::open("notes")?);
//! let store = Arc::new(FileStore::open("notes/.sift")?);
//! let engine = SearchEngine::new(Settings::default(), Providers::from_one(vault), store);
//! let handle = EngineHandle::new(engine);
//!
//! for page in handle.search("garden -weeds ext:md") {
//!     println!("{} {:.2}", page.document.id, page.score);
//! }
//! ```

pub mod cache;
pub mod config;
pub mod engine;
mod error;
pub mod excerpt;
pub mod fuzzy;
pub mod index;
pub mod query;
pub mod scoring;
pub mod tokenize;
pub mod types;
pub mod util;
pub mod vault;

#[doc(hidden)]
pub mod testing;

// Re-exports for public API
pub use cache::{CacheBlob, CacheError, CacheStore, EntryCache, FileStore, MemoryStore, SchemaVersion};
pub use config::{ConfigError, FieldError, FieldWeights, Fuzziness, RecencyCutoff, Settings};
pub use engine::{
    ContentProvider, DocumentSource, EngineHandle, EngineState, ExtractionHook, IndexReport,
    MetadataProvider, PendingAction, ProviderError, Providers, SearchEngine,
};
pub use error::{Error, Result};
pub use excerpt::{get_groups, get_matches, highlight_text, make_excerpt, ExcerptOptions, MatchOptions};
pub use index::{IndexError, IndexOptions, InvertedIndex, SearchOptions};
pub use query::{ParseOptions, Query};
pub use tokenize::{tokenize_for_indexing, tokenize_for_search, DisjunctiveQuery, TokenizeOptions};
pub use types::{
    solve_navigation_map, CacheMode, CompleteEntry, Document, DocumentMeta, ExtractedContent,
    NavigationMap, NavigationRoute, RankedHit, ResultExcerpt, ResultPage, SearchMatch,
};
pub use vault::Vault;
