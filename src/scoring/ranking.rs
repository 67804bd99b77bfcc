// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The ranking pipeline: filters and boosts applied to raw index hits.
//!
//! Stages run in a fixed order:
//!
//! ```text
//!  1. empty query            → []
//!  2. include.ext            keep matching extensions
//!  3. include.path           keep matching paths
//!  4. exclude.path/ext       drop matching paths and extensions
//!  5. nothing left           → []
//!  6. single-document mode   → that id only, no further ranking
//!  7. folder downrank        ÷10 per matching folder filter
//!  8. custom properties      × weight when a matched term is a property value
//!  9. tags                   ×100 per query tag the document carries
//! 10. sort, keep MAX_RESULTS
//! 11. exact terms            drop hits missing a quoted phrase
//! 12. excluded text          drop hits containing an excluded term
//! ```
//!
//! Truncation (10) happens before the exact-term filter (11): an exact match
//! ranked just below the cutoff is lost.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::query::Query;
use crate::types::{extension_of, name_from_path, CompleteEntry, RankedHit};
use crate::util::remove_diacritics;

/// Hits kept after sorting.
pub const MAX_RESULTS: usize = 50;

/// Divisor applied once per matching downranked folder.
pub const DOWNRANK_DIVISOR: f64 = 10.0;

/// Multiplier per query tag present on the document.
pub const TAG_BOOST: f64 = 100.0;

/// Ranking knobs taken from the settings.
#[derive(Debug, Clone, Copy)]
pub struct RankingOptions<'a> {
    pub downranked_folders: &'a [String],
    pub custom_property_weights: &'a BTreeMap<String, f64>,
    pub ignore_arabic_diacritics: bool,
    /// Restrict results to this id and skip ranking.
    pub single_document: Option<&'a str>,
}

/// Does the id's extension start with any requested extension?
///
/// Requested values may omit the dot; `can` matches `.canvas`.
pub fn matches_extension(id: &str, wanted: &[String]) -> bool {
    let ext = extension_of(id).to_lowercase();
    wanted.iter().any(|e| {
        let e = e.to_lowercase();
        if e.starts_with('.') {
            ext.starts_with(&e)
        } else {
            ext.starts_with(&format!(".{}", e))
        }
    })
}

/// Case-insensitive substring match of the id against any value.
pub fn matches_path(id: &str, wanted: &[String]) -> bool {
    let id = id.to_lowercase();
    wanted.iter().any(|p| id.contains(&p.to_lowercase()))
}

/// Does `filter` name a whole folder on the document's path?
///
/// `archive` matches `archive`, `archive/x` and `notes/archive/x`, never `archived/x`.
pub fn in_folder(id: &str, filter: &str) -> bool {
    let name = name_from_path(id);
    name == filter
        || name
            .strip_prefix(filter)
            .is_some_and(|rest| rest.starts_with('/'))
        || name.split('/').any(|part| part == filter)
}

/// Flatten a metadata value into comparable strings.
fn property_values(value: &serde_json::Value) -> Vec<String> {
    use serde_json::Value;
    match value {
        Value::String(s) => vec![s.to_lowercase()],
        Value::Number(n) => vec![n.to_string()],
        Value::Bool(b) => vec![b.to_string()],
        Value::Array(items) => items.iter().flat_map(property_values).collect(),
        Value::Null | Value::Object(_) => Vec::new(),
    }
}

/// Apply the filter stages that need no document content (2–4).
pub fn apply_filters(query: &Query, hits: &mut Vec<RankedHit>) {
    if !query.include.ext.is_empty() {
        hits.retain(|h| matches_extension(&h.id, &query.include.ext));
    }
    if !query.include.path.is_empty() {
        hits.retain(|h| matches_path(&h.id, &query.include.path));
    }
    if !query.exclude.path.is_empty() {
        hits.retain(|h| !matches_path(&h.id, &query.exclude.path));
    }
    if !query.exclude.ext.is_empty() {
        hits.retain(|h| !matches_extension(&h.id, &query.exclude.ext));
    }
}

/// Multiplicative adjustments (7–9).
pub fn apply_boosts(
    query: &Query,
    hits: &mut [RankedHit],
    options: &RankingOptions<'_>,
    entries: &HashMap<String, Arc<CompleteEntry>>,
) {
    let tags: Vec<String> = query.tags().iter().map(|t| t.to_lowercase()).collect();

    for hit in hits.iter_mut() {
        for filter in options.downranked_folders {
            if in_folder(&hit.id, filter) {
                hit.score /= DOWNRANK_DIVISOR;
            }
        }

        if let Some(entry) = entries.get(&hit.id) {
            for (property, weight) in options.custom_property_weights {
                let Some(value) = entry.document.metadata.get(property) else {
                    continue;
                };
                let values = property_values(value);
                if hit.terms.iter().any(|t| values.contains(&t.to_lowercase())) {
                    hit.score *= weight;
                }
            }
        }

        for tag in &tags {
            if hit.stored.tags.iter().any(|t| t.to_lowercase() == *tag) {
                hit.score *= TAG_BOOST;
            }
        }
    }
}

/// Sort by descending score (ties by id) and keep the best [`MAX_RESULTS`].
pub fn sort_and_truncate(hits: &mut Vec<RankedHit>) {
    hits.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));
    hits.truncate(MAX_RESULTS);
}

/// Drop hits whose title and cleaned content lack any exact term (11).
pub fn filter_exact_terms(
    exact_terms: &[String],
    hits: &mut Vec<RankedHit>,
    entries: &HashMap<String, Arc<CompleteEntry>>,
    arabic: bool,
) {
    if exact_terms.is_empty() {
        return;
    }
    hits.retain(|hit| {
        let Some(entry) = entries.get(&hit.id) else {
            return false;
        };
        let content = entry.cleaned_content.to_lowercase();
        let title = remove_diacritics(&entry.document.name.to_lowercase(), arabic);
        exact_terms
            .iter()
            .all(|q| content.contains(q.as_str()) || title.contains(q.as_str()))
    });
}

/// Drop hits whose content contains an excluded term (12).
pub fn filter_exclusions(
    excluded: &[String],
    hits: &mut Vec<RankedHit>,
    entries: &HashMap<String, Arc<CompleteEntry>>,
) {
    if excluded.is_empty() {
        return;
    }
    hits.retain(|hit| {
        let content = entries
            .get(&hit.id)
            .map(|e| e.document.content.to_lowercase())
            .unwrap_or_default();
        excluded.iter().all(|q| !content.contains(q.as_str()))
    });
}

/// Run the whole pipeline.
///
/// `load` resolves an id to its complete entry; it is called at most once per
/// surviving hit, after the cheap filters.
pub fn rank<F>(
    query: &Query,
    mut hits: Vec<RankedHit>,
    options: &RankingOptions<'_>,
    mut load: F,
) -> Vec<RankedHit>
where
    F: FnMut(&str) -> Option<Arc<CompleteEntry>>,
{
    if query.is_empty() {
        return Vec::new();
    }

    apply_filters(query, &mut hits);
    if hits.is_empty() {
        return hits;
    }

    if let Some(target) = options.single_document {
        hits.retain(|h| h.id == target);
        return hits;
    }

    let entries: HashMap<String, Arc<CompleteEntry>> = hits
        .iter()
        .filter_map(|h| load(&h.id).map(|e| (h.id.clone(), e)))
        .collect();

    apply_boosts(query, &mut hits, options, &entries);
    sort_and_truncate(&mut hits);
    filter_exact_terms(&query.exact_terms(), &mut hits, &entries, options.ignore_arabic_diacritics);
    filter_exclusions(&query.exclude.text, &mut hits, &entries);
    hits
}
