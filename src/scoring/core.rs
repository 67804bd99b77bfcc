// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The math behind search ranking.
//!
//! Relevance is BM25+ per field, weighted three ways:
//!
//! ```text
//! score(doc) = Σ  term_weight × field_boost × recency(doc) × bm25+(tf, df, len)
//!            × |distinct query terms matched|
//! ```
//!
//! `term_weight` is 1 for an exact hit and shrinks for prefix and fuzzy
//! expansions, so `note` beats `notebook` for the query `note`, and
//! `notebook` still beats `nitebook`.

use crate::config::RecencyCutoff;

// =============================================================================
// SCORING CONSTANTS
// =============================================================================

/// BM25 term-frequency saturation.
pub const BM25_K: f64 = 1.2;

/// BM25 length normalization.
pub const BM25_B: f64 = 0.7;

/// BM25+ lower bound on a matching term's contribution.
pub const BM25_D: f64 = 0.5;

/// Weight of a prefix expansion, before the length penalty.
pub const PREFIX_WEIGHT: f64 = 0.375;

/// Weight of a fuzzy expansion, before the distance penalty.
pub const FUZZY_WEIGHT: f64 = 0.45;

/// Hard cap on fuzzy edit distance regardless of term length.
pub const MAX_FUZZY_DISTANCE: usize = 6;

/// Terms this short are never fuzzy-matched.
pub const EXACT_ONLY_LEN: usize = 3;

/// Terms this short get half the configured fuzziness.
pub const HALF_FUZZY_LEN: usize = 5;

const MS_PER_DAY: f64 = 24.0 * 3600.0 * 1000.0;

/// BM25+ score of one term in one field of one document.
///
/// `doc_freq` is the number of documents containing the term in this field.
pub fn bm25_plus(
    term_freq: u32,
    doc_freq: usize,
    doc_count: usize,
    field_len: u32,
    avg_field_len: f64,
) -> f64 {
    let df = doc_freq as f64;
    let idf = (1.0 + (doc_count as f64 - df + 0.5) / (df + 0.5)).ln();
    let tf = f64::from(term_freq);
    let norm = if avg_field_len > 0.0 {
        f64::from(field_len) / avg_field_len
    } else {
        1.0
    };
    idf * (BM25_D + tf * (BM25_K + 1.0) / (tf + BM25_K * (1.0 - BM25_B + BM25_B * norm)))
}

/// Weight of an index term reached by prefix expansion.
///
/// `extra` is how many chars the index term has beyond the query term.
pub fn prefix_weight(term_len: usize, extra: usize) -> f64 {
    let len = term_len as f64;
    PREFIX_WEIGHT * len / (len + 0.3 * extra as f64)
}

/// Weight of an index term reached by fuzzy expansion.
pub fn fuzzy_weight(term_len: usize, distance: usize) -> f64 {
    let len = term_len as f64;
    FUZZY_WEIGHT * len / (len + distance as f64)
}

/// Edit-distance budget for a query term of `term_len` chars.
///
/// Short terms are exact; up to five chars get half the configured ratio.
pub fn max_fuzzy_distance(term_len: usize, fuzziness: f64) -> usize {
    let ratio = if term_len <= EXACT_ONLY_LEN {
        0.0
    } else if term_len <= HALF_FUZZY_LEN {
        fuzziness / 2.0
    } else {
        fuzziness
    };
    ((term_len as f64 * ratio).round() as usize).min(MAX_FUZZY_DISTANCE)
}

/// Recency multiplier: `1 + exp(k · days_elapsed)`.
///
/// A zero timestamp (unknown) or a disabled cutoff yields 1. Timestamps in
/// the future count as modified now.
pub fn recency_multiplier(cutoff: RecencyCutoff, last_modified_ms: i64, now_ms: i64) -> f64 {
    let Some(k) = cutoff.decay_per_day() else {
        return 1.0;
    };
    if last_modified_ms == 0 {
        return 1.0;
    }
    let days = ((now_ms - last_modified_ms) as f64 / MS_PER_DAY).max(0.0);
    1.0 + (k * days).exp()
}
