// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Query parsing: raw text into free-text terms, exact phrases and filters.
//!
//! ```text
//! "Hello World" foo -bar ext:md .canvas -path:archive
//!   text_terms     = ["hello world", "foo"]
//!   exact_phrases  = ["Hello World"]
//!   include.ext    = ["canvas", "md"]
//!   exclude.text   = ["bar"]
//!   exclude.path   = ["archive"]
//! ```
//!
//! Parsing never fails. Malformed fragments degrade to free text.

mod parser;

use serde::{Deserialize, Serialize};

use crate::util::remove_diacritics;
use parser::{classify, lex, quoted_phrases, Fragment};

/// Recognized `key:value` filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Ext,
    Path,
}

pub(crate) const KEYWORDS: [(&str, Keyword); 2] = [("ext", Keyword::Ext), ("path", Keyword::Path)];

/// Diacritic handling applied to the raw query before parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub ignore_diacritics: bool,
    pub ignore_arabic_diacritics: bool,
}

/// Positive keyword filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordFilters {
    pub ext: Vec<String>,
    pub path: Vec<String>,
}

/// Negated filters: free text plus the keyword filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exclusions {
    pub text: Vec<String>,
    pub ext: Vec<String>,
    pub path: Vec<String>,
}

/// A parsed query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub text_terms: Vec<String>,
    /// Quoted spans, case preserved.
    pub exact_phrases: Vec<String>,
    pub include: KeywordFilters,
    pub exclude: Exclusions,
}

/// Extensions compare without their leading dot.
fn push_extension(list: &mut Vec<String>, value: &str) {
    let ext = value.trim_start_matches('.');
    if !ext.is_empty() && !list.iter().any(|e| e == ext) {
        list.push(ext.to_string());
    }
}

impl Query {
    /// Parse raw query text.
    pub fn parse(raw: &str, options: ParseOptions) -> Self {
        let text = if options.ignore_diacritics {
            remove_diacritics(raw, options.ignore_arabic_diacritics)
        } else {
            raw.to_string()
        };

        let mut query = Query {
            exact_phrases: quoted_phrases(&text),
            ..Query::default()
        };

        let mut keyword_ext = Vec::new();
        let mut excluded_ext = Vec::new();
        for fragment in lex(&text.to_lowercase()) {
            match classify(&fragment) {
                Fragment::Text { value, negated: true } => {
                    if !value.trim().is_empty() {
                        query.exclude.text.push(value);
                    }
                }
                Fragment::Text { value, negated: false } => {
                    if !value.is_empty() {
                        query.text_terms.push(value);
                    }
                }
                Fragment::Keyword { key, values, negated } => {
                    let bucket = match (key, negated) {
                        (Keyword::Ext, false) => &mut keyword_ext,
                        (Keyword::Path, false) => &mut query.include.path,
                        (Keyword::Ext, true) => &mut excluded_ext,
                        (Keyword::Path, true) => &mut query.exclude.path,
                    };
                    bucket.extend(values);
                }
            }
        }

        // `.canvas` is shorthand for `ext:canvas`; values are already lowercase
        let (dotted, text_terms): (Vec<String>, Vec<String>) = query
            .text_terms
            .into_iter()
            .partition(|t| t.starts_with('.'));
        query.text_terms = text_terms;
        for ext in dotted.iter().chain(&keyword_ext) {
            push_extension(&mut query.include.ext, ext);
        }
        for ext in &excluded_ext {
            push_extension(&mut query.exclude.ext, ext);
        }

        query
    }

    /// True when there is no free text to search for. Keyword filters alone
    /// never produce hits.
    pub fn is_empty(&self) -> bool {
        self.text_terms.is_empty()
    }

    /// Free-text terms joined by single spaces; the input to search tokenization.
    pub fn segments_to_str(&self) -> String {
        self.text_terms.join(" ")
    }

    /// Free-text terms that are tags (`#work`).
    pub fn tags(&self) -> Vec<&str> {
        self.text_terms
            .iter()
            .filter(|t| t.starts_with('#'))
            .map(String::as_str)
            .collect()
    }

    pub fn tags_without_hashtag(&self) -> Vec<&str> {
        self.tags()
            .into_iter()
            .map(|t| t.strip_prefix('#').unwrap_or(t))
            .collect()
    }

    /// Terms that must appear verbatim: multi-word segments and quoted phrases,
    /// lowercased and deduplicated in first-seen order.
    pub fn exact_terms(&self) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let multi_word = self.text_terms.iter().filter(|t| t.contains(char::is_whitespace));
        for term in multi_word.chain(self.exact_phrases.iter()) {
            let term = term.to_lowercase();
            if !out.contains(&term) {
                out.push(term);
            }
        }
        out
    }

    /// The string an excerpt should be centred on: the longest quoted phrase
    /// (first one wins ties), or the whole free-text query.
    pub fn best_string_for_excerpt(&self) -> String {
        let mut best: Option<&String> = None;
        for phrase in &self.exact_phrases {
            if best.map_or(true, |b| phrase.chars().count() > b.chars().count()) {
                best = Some(phrase);
            }
        }
        best.cloned().unwrap_or_else(|| self.segments_to_str())
    }
}
