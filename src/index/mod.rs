// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Field-weighted inverted index.
//!
//! Each index term maps to one posting list per indexed field, and each
//! posting list maps a document slot to a term frequency:
//!
//! ```text
//! "search" ─▶ content:  {0: 3, 7: 1}
//!             basename: {7: 1}
//!             directory, aliases, displayName: {}
//! ```
//!
//! Documents are keyed by their string id; internally they occupy a `u32`
//! slot that is never reused, so postings stay valid across removals.
//!
//! The index is not internally synchronized. Callers serialize mutations;
//! the engine does this with an `RwLock`.

mod search;

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::warn;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::tokenize::{tokenize_for_indexing, TokenizeOptions};
use crate::types::{Document, IndexedField, StoredFields};
use crate::util::remove_diacritics;

pub use search::{Recency, SearchOptions};

const FIELD_COUNT: usize = IndexedField::ALL.len();

/// Index failures.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("document already indexed: {0}")]
    Duplicate(String),

    #[error("index serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Options that shape index terms. They are not persisted: a restored index
/// must be given the options it was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    pub tokenize: TokenizeOptions,
    pub ignore_diacritics: bool,
    pub ignore_arabic_diacritics: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            tokenize: TokenizeOptions::default(),
            ignore_diacritics: true,
            ignore_arabic_diacritics: false,
        }
    }
}

impl IndexOptions {
    /// Normalize a token into an index term (and a query term into a lookup key).
    pub fn process_term(&self, term: &str) -> String {
        if self.ignore_diacritics {
            remove_diacritics(term, self.ignore_arabic_diacritics).to_lowercase()
        } else {
            term.to_lowercase()
        }
    }
}

/// Per-field posting lists for one term: slot → term frequency.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Postings {
    fields: [BTreeMap<u32, u32>; FIELD_COUNT],
}

impl Postings {
    fn is_empty(&self) -> bool {
        self.fields.iter().all(BTreeMap::is_empty)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocEntry {
    id: String,
    /// Distinct terms per field; the field length for BM25.
    terms: [Vec<String>; FIELD_COUNT],
    stored: StoredFields,
}

impl DocEntry {
    fn field_len(&self, field: usize) -> u32 {
        self.terms[field].len() as u32
    }
}

/// A document tokenized and normalized, ready to be committed.
#[derive(Debug, Clone)]
pub struct PreparedDocument {
    id: String,
    term_freqs: [BTreeMap<String, u32>; FIELD_COUNT],
    stored: StoredFields,
}

impl PreparedDocument {
    pub fn id(&self) -> &str {
        &self.id
    }
}

/// Tokenize and normalize every indexed field of `doc`. Pure; safe to run in parallel.
pub fn prepare(options: &IndexOptions, doc: &Document) -> PreparedDocument {
    let term_freqs = IndexedField::ALL.map(|field| {
        let mut freqs = BTreeMap::new();
        for token in tokenize_for_indexing(&doc.field_text(field), &options.tokenize) {
            let term = options.process_term(&token);
            if !term.is_empty() {
                *freqs.entry(term).or_insert(0) += 1;
            }
        }
        freqs
    });
    PreparedDocument {
        id: doc.id.clone(),
        term_freqs,
        stored: doc.stored_fields(),
    }
}

/// The inverted index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvertedIndex {
    #[serde(skip)]
    options: IndexOptions,
    docs: BTreeMap<u32, DocEntry>,
    slots: HashMap<String, u32>,
    next_slot: u32,
    terms: BTreeMap<String, Postings>,
    field_len_sums: [u64; FIELD_COUNT],
}

impl InvertedIndex {
    pub fn new(options: IndexOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Number of distinct index terms.
    pub fn term_count(&self) -> usize {
        self.terms.len()
    }

    pub fn has(&self, id: &str) -> bool {
        self.slots.contains_key(id)
    }

    /// Indexed ids in slot (insertion) order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.docs.values().map(|d| d.id.as_str())
    }

    pub fn stored(&self, id: &str) -> Option<&StoredFields> {
        let slot = self.slots.get(id)?;
        self.docs.get(slot).map(|d| &d.stored)
    }

    /// Add a new document. Fails if the id is already indexed.
    pub fn add(&mut self, doc: &Document) -> Result<(), IndexError> {
        let prepared = prepare(&self.options, doc);
        self.commit(prepared)
    }

    /// Add or overwrite a document.
    pub fn replace(&mut self, doc: &Document) {
        let prepared = prepare(&self.options, doc);
        self.upsert(prepared);
    }

    /// Commit a prepared document, overwriting any previous version.
    pub fn upsert(&mut self, prepared: PreparedDocument) {
        self.remove(&prepared.id);
        self.insert(prepared);
    }

    /// Commit a prepared document. Fails if the id is already indexed.
    pub fn commit(&mut self, prepared: PreparedDocument) -> Result<(), IndexError> {
        if self.has(&prepared.id) {
            return Err(IndexError::Duplicate(prepared.id));
        }
        self.insert(prepared);
        Ok(())
    }

    /// Add many documents at once. Tokenization runs in parallel when the
    /// `parallel` feature is enabled; duplicates are skipped with a warning.
    /// Returns how many documents were added.
    pub fn add_all(&mut self, docs: &[Document]) -> usize {
        let options = self.options;

        #[cfg(feature = "parallel")]
        let prepared: Vec<PreparedDocument> = docs.par_iter().map(|d| prepare(&options, d)).collect();

        #[cfg(not(feature = "parallel"))]
        let prepared: Vec<PreparedDocument> = docs.iter().map(|d| prepare(&options, d)).collect();

        let mut added = 0;
        for doc in prepared {
            match self.commit(doc) {
                Ok(()) => added += 1,
                Err(e) => warn!(error = %e, "skipping document"),
            }
        }
        added
    }

    fn insert(&mut self, prepared: PreparedDocument) {
        let slot = self.next_slot;
        self.next_slot += 1;

        let mut terms: [Vec<String>; FIELD_COUNT] = Default::default();
        for (field, freqs) in prepared.term_freqs.into_iter().enumerate() {
            self.field_len_sums[field] += freqs.len() as u64;
            for (term, tf) in freqs {
                self.terms.entry(term.clone()).or_default().fields[field].insert(slot, tf);
                terms[field].push(term);
            }
        }

        self.slots.insert(prepared.id.clone(), slot);
        self.docs.insert(
            slot,
            DocEntry {
                id: prepared.id,
                terms,
                stored: prepared.stored,
            },
        );
    }

    /// Remove a document. Missing ids are ignored. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(slot) = self.slots.remove(id) else {
            return false;
        };
        let Some(entry) = self.docs.remove(&slot) else {
            return false;
        };

        for (field, terms) in entry.terms.iter().enumerate() {
            self.field_len_sums[field] -= terms.len() as u64;
            for term in terms {
                if let Some(postings) = self.terms.get_mut(term) {
                    postings.fields[field].remove(&slot);
                    if postings.is_empty() {
                        self.terms.remove(term);
                    }
                }
            }
        }
        true
    }

    /// Drop every document.
    pub fn clear(&mut self) {
        *self = Self::new(self.options);
    }

    fn avg_field_len(&self, field: usize) -> f64 {
        if self.docs.is_empty() {
            0.0
        } else {
            self.field_len_sums[field] as f64 / self.docs.len() as f64
        }
    }

    /// Serialize to JSON bytes. Options are not included.
    pub fn serialize(&self) -> Result<Vec<u8>, IndexError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Rebuild an index from [`InvertedIndex::serialize`] output. `options`
    /// must match the ones the index was built with; this is not checked.
    pub fn restore(bytes: &[u8], options: IndexOptions) -> Result<Self, IndexError> {
        let mut index: InvertedIndex = serde_json::from_slice(bytes)?;
        index.options = options;
        Ok(index)
    }
}
