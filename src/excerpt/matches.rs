// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Locating match offsets in raw content.
//!
//! The haystack is the HTML-escaped, diacritic-folded copy of the text. Each
//! of its chars remembers which source char produced it, so a regex hit in
//! the haystack maps back to a char range of the original:
//!
//! ```text
//! source    T  o  m  ␠  &            J  é  r  r  y
//! haystack  T  o  m  ␠  &  a  m  p  ;  J  e  r  r  y
//! origin    0  1  2  3  4  4  4  4  4  5  6  7  8  9
//! ```
//!
//! Offsets are char indices into the source text. Match strings are the
//! escaped source text, so they can be found again in an escaped excerpt.

use std::time::{Duration, Instant};

use regex::{Regex, RegexBuilder};
use tracing::{debug, warn};

use crate::query::Query;
use crate::types::SearchMatch;
use crate::util::{entity, escape_html, fold_char, fold_for_matching, lowercase_aligned};

/// Matches collected per call, at most.
pub const MAX_MATCHES: usize = 100;

/// Wall-clock budget for one call.
pub const MATCH_TIME_BUDGET: Duration = Duration::from_millis(50);

/// Diacritic handling used while matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchOptions {
    pub ignore_diacritics: bool,
    pub ignore_arabic_diacritics: bool,
}

impl MatchOptions {
    fn fold(&self, c: char) -> char {
        if self.ignore_diacritics {
            fold_char(c, self.ignore_arabic_diacritics)
        } else {
            c
        }
    }
}

/// One case-insensitive alternation of `words`, longest first so that a
/// phrase wins over the words it contains.
pub(crate) fn alternation(words: &[String]) -> Result<Regex, regex::Error> {
    let mut sorted: Vec<&String> = words.iter().filter(|w| !w.is_empty()).collect();
    sorted.sort_by_key(|w| std::cmp::Reverse(w.chars().count()));
    let pattern = sorted
        .iter()
        .map(|w| regex::escape(w))
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&format!("({})", pattern))
        .case_insensitive(true)
        .build()
}

struct Haystack {
    text: String,
    /// (byte offset in `text`, source char index), one per haystack char run.
    origin: Vec<(usize, usize)>,
}

impl Haystack {
    fn build(source: &[char], options: &MatchOptions) -> Self {
        let mut text = String::with_capacity(source.len());
        let mut origin = Vec::with_capacity(source.len());
        for (i, &c) in source.iter().enumerate() {
            origin.push((text.len(), i));
            let folded = options.fold(c);
            match entity(folded) {
                Some(e) => text.push_str(e),
                None => text.push(folded),
            }
        }
        Self { text, origin }
    }

    /// Source char index of the char that produced haystack byte `byte`.
    fn source_index(&self, byte: usize) -> usize {
        let i = self.origin.partition_point(|&(b, _)| b <= byte);
        self.origin[i.saturating_sub(1)].1
    }
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Find every occurrence of `words` in `text`.
///
/// Bounded to [`MAX_MATCHES`] hits and [`MATCH_TIME_BUDGET`]. When `query`
/// has several terms or exact phrases and its best excerpt string starts
/// exactly where a match starts, that match is moved to the front and
/// widened to the whole string.
pub fn get_matches(
    text: &str,
    words: &[String],
    query: Option<&Query>,
    options: &MatchOptions,
) -> Vec<SearchMatch> {
    let words: Vec<String> = words.iter().map(|w| escape_html(w)).collect();
    if words.iter().all(String::is_empty) {
        return Vec::new();
    }
    let regex = match alternation(&words) {
        Ok(regex) => regex,
        Err(e) => {
            warn!(error = %e, "match pattern failed to compile");
            return Vec::new();
        }
    };

    let source: Vec<char> = text.chars().collect();
    let haystack = Haystack::build(&source, options);

    let started = Instant::now();
    let mut matches = Vec::new();
    for m in regex.find_iter(&haystack.text) {
        if matches.len() >= MAX_MATCHES {
            break;
        }
        if started.elapsed() > MATCH_TIME_BUDGET {
            debug!(found = matches.len(), "match time budget exhausted");
            break;
        }
        let start = haystack.source_index(m.start());
        let end = haystack.source_index(m.end().saturating_sub(1)) + 1;
        let original: String = source[start..end.min(source.len())].iter().collect();
        let escaped = escape_html(&original);
        let trimmed = escaped.trim();
        if !trimmed.is_empty() {
            matches.push(SearchMatch::new(trimmed, start));
        }
    }

    if let Some(query) = query {
        if query.text_terms.len() > 1 || !query.exact_terms().is_empty() {
            promote_best(&mut matches, &source, query, options);
        }
    }

    matches
}

fn promote_best(matches: &mut Vec<SearchMatch>, source: &[char], query: &Query, options: &MatchOptions) {
    let best: Vec<char> = lowercase_aligned(&query.best_string_for_excerpt()).chars().collect();
    let text: String = source.iter().collect();
    let folded = if options.ignore_diacritics {
        fold_for_matching(&text, options.ignore_arabic_diacritics)
    } else {
        text
    };
    let folded: Vec<char> = lowercase_aligned(&folded).chars().collect();

    let Some(offset) = find_chars(&folded, &best) else {
        return;
    };
    let Some(existing) = matches.iter().position(|m| m.offset == offset) else {
        return;
    };
    matches.remove(existing);
    let original: String = source[offset..offset + best.len()].iter().collect();
    matches.insert(0, SearchMatch::new(escape_html(&original), offset));
}
