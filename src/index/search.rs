// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Query execution over the inverted index.
//!
//! A [`DisjunctiveQuery`] is evaluated bottom-up:
//!
//! 1. Each query term expands to exact, prefix and fuzzy index terms, and each
//!    expansion contributes `weight × field boost × recency × BM25+` per field.
//! 2. An AND-group keeps documents hit by every one of its terms, summing scores.
//! 3. The OR of groups keeps every document hit by any group, summing scores.
//! 4. A document's final score is multiplied by how many distinct query terms
//!    it matched.

use std::collections::{BTreeMap, HashMap};

use crate::config::RecencyCutoff;
use crate::fuzzy::bounded_edit_distance;
use crate::scoring::core::{
    bm25_plus, fuzzy_weight, max_fuzzy_distance, prefix_weight, recency_multiplier,
};
use crate::tokenize::DisjunctiveQuery;
use crate::types::{RankedHit, StoredFields};

use super::{InvertedIndex, Postings, FIELD_COUNT};

/// Recency boost configuration, evaluated per document against `now_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Recency {
    pub cutoff: RecencyCutoff,
    pub now_ms: i64,
}

impl Recency {
    pub fn multiplier(&self, stored: &StoredFields) -> f64 {
        recency_multiplier(self.cutoff, stored.last_modified, self.now_ms)
    }
}

/// Per-search tuning.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    /// Query terms at least this many chars long also match as prefixes.
    pub prefix_min_len: usize,
    /// Allowed edit distance as a fraction of term length.
    pub fuzziness: f64,
    /// Boost per field, in [`IndexedField::ALL`](crate::types::IndexedField::ALL) order.
    pub field_boosts: [f64; FIELD_COUNT],
    pub recency: Recency,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            prefix_min_len: 1,
            fuzziness: 0.0,
            field_boosts: [1.0; FIELD_COUNT],
            recency: Recency::default(),
        }
    }
}

/// Accumulated score for one document while a query is evaluated.
#[derive(Debug, Clone, Default)]
struct Partial {
    score: f64,
    query_terms: Vec<String>,
    terms: Vec<String>,
}

fn push_unique(list: &mut Vec<String>, value: &str) {
    if !list.iter().any(|v| v == value) {
        list.push(value.to_string());
    }
}

impl Partial {
    fn absorb(&mut self, other: Partial) {
        self.score += other.score;
        for t in &other.query_terms {
            push_unique(&mut self.query_terms, t);
        }
        for t in &other.terms {
            push_unique(&mut self.terms, t);
        }
    }
}

type Hits = BTreeMap<u32, Partial>;

impl InvertedIndex {
    /// Run `query` and return hits sorted by descending score, ties by id.
    pub fn search(&self, query: &DisjunctiveQuery, options: &SearchOptions) -> Vec<RankedHit> {
        let mut combined = Hits::new();
        let mut cache: HashMap<String, Hits> = HashMap::new();

        for group in &query.groups {
            let mut group_hits: Option<Hits> = None;
            for raw in &group.terms {
                let term = self.options.process_term(raw);
                if term.is_empty() {
                    continue;
                }
                let hits = cache
                    .entry(term.clone())
                    .or_insert_with(|| self.execute_term(&term, options))
                    .clone();
                group_hits = Some(match group_hits {
                    None => hits,
                    Some(acc) => intersect(acc, hits),
                });
            }
            for (slot, partial) in group_hits.unwrap_or_default() {
                combined.entry(slot).or_default().absorb(partial);
            }
        }

        let mut hits: Vec<RankedHit> = combined
            .into_iter()
            .filter_map(|(slot, partial)| {
                let entry = self.docs.get(&slot)?;
                let quality = partial.query_terms.len().max(1) as f64;
                Some(RankedHit {
                    id: entry.id.clone(),
                    score: partial.score * quality,
                    terms: partial.terms,
                    query_terms: partial.query_terms,
                    stored: entry.stored.clone(),
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
        hits
    }

    /// Exact, prefix and fuzzy matches for one processed query term.
    fn execute_term(&self, term: &str, options: &SearchOptions) -> Hits {
        let mut hits = Hits::new();
        let term_len = term.chars().count();

        if let Some(postings) = self.terms.get(term) {
            self.score_postings(term, term, 1.0, postings, options, &mut hits);
        }

        let mut prefixed: Vec<&str> = Vec::new();
        if term_len >= options.prefix_min_len {
            for (candidate, postings) in self.terms.range::<str, _>((std::ops::Bound::Included(term), std::ops::Bound::Unbounded)) {
                if !candidate.starts_with(term) {
                    break;
                }
                let len = candidate.chars().count();
                if len == term_len {
                    continue;
                }
                prefixed.push(candidate);
                let weight = prefix_weight(len, len - term_len);
                self.score_postings(term, candidate, weight, postings, options, &mut hits);
            }
        }

        let max_distance = max_fuzzy_distance(term_len, options.fuzziness);
        if max_distance > 0 {
            for (candidate, postings) in &self.terms {
                if candidate == term || prefixed.contains(&candidate.as_str()) {
                    continue;
                }
                if let Some(distance) = bounded_edit_distance(term, candidate, max_distance) {
                    let weight = fuzzy_weight(candidate.chars().count(), distance);
                    self.score_postings(term, candidate, weight, postings, options, &mut hits);
                }
            }
        }

        hits
    }

    fn score_postings(
        &self,
        query_term: &str,
        index_term: &str,
        weight: f64,
        postings: &Postings,
        options: &SearchOptions,
        hits: &mut Hits,
    ) {
        let doc_count = self.docs.len();
        for (field, freqs) in postings.fields.iter().enumerate() {
            let boost = options.field_boosts[field];
            if freqs.is_empty() || boost == 0.0 {
                continue;
            }
            let avg = self.avg_field_len(field);
            for (&slot, &tf) in freqs {
                let Some(entry) = self.docs.get(&slot) else {
                    continue;
                };
                let doc_boost = options.recency.multiplier(&entry.stored);
                let bm25 = bm25_plus(tf, freqs.len(), doc_count, entry.field_len(field), avg);
                let partial = hits.entry(slot).or_default();
                partial.score += weight * boost * doc_boost * bm25;
                push_unique(&mut partial.query_terms, query_term);
                push_unique(&mut partial.terms, index_term);
            }
        }
    }
}

fn intersect(mut left: Hits, right: Hits) -> Hits {
    let mut out = Hits::new();
    for (slot, partial) in right {
        if let Some(mut acc) = left.remove(&slot) {
            acc.absorb(partial);
            out.insert(slot, acc);
        }
    }
    out
}
