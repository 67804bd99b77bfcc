// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Dual-mode tokenization: index time and search time.
//!
//! Index-time tokenization produces a flat, deduplicated token set: the union of
//! every strategy in the [rule table](rules). A document containing `foo-bar`
//! is indexed under `foo-bar`, `foo` and `bar`.
//!
//! Search-time tokenization produces a [`DisjunctiveQuery`]: an OR of AND-groups,
//! one group per strategy. The two modes do not have to agree exactly. A query
//! matches if any single strategy's tokens are all present, which buys recall
//! (`foo-bar` finds `foo bar`) without giving up precision inside a strategy.
//!
//! ```text
//! "fooBar-baz"
//!   OR ┬ AND[fooBar-baz]        Tokens
//!      ├ AND[fooBar-baz]        Words
//!      ├ AND[fooBar, baz]       Hyphens
//!      └ AND[foo, Bar-baz]      CamelCase
//! ```

pub mod rules;
pub mod urls;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{error, warn};

pub use rules::{split_camel_case, split_hyphens, split_tokens, split_words, Strategy};
pub use urls::extract_urls;

/// Tokenization failures. Never escape the public entry points.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    #[error("{0} pattern failed to compile")]
    Pattern(&'static str),
}

/// Knobs shared by both tokenization modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenizeOptions {
    /// Index markdown link targets as whole tokens.
    pub tokenize_urls: bool,
    /// Emit the camelCase strategy.
    pub split_camel_case: bool,
}

impl Default for TokenizeOptions {
    fn default() -> Self {
        Self {
            tokenize_urls: true,
            split_camel_case: true,
        }
    }
}

impl TokenizeOptions {
    fn enabled(&self, strategy: Strategy) -> bool {
        strategy != Strategy::CamelCase || self.split_camel_case
    }
}

/// One AND-group of a search: every term must be present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermGroup {
    pub strategy: Strategy,
    pub terms: Vec<String>,
}

/// OR of AND-groups, the search-time token structure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisjunctiveQuery {
    pub groups: Vec<TermGroup>,
}

impl DisjunctiveQuery {
    /// True when no group has a term to look up.
    pub fn is_empty(&self) -> bool {
        self.groups.iter().all(|g| g.terms.is_empty())
    }

    /// The group produced by `strategy`, if it was emitted.
    pub fn group(&self, strategy: Strategy) -> Option<&TermGroup> {
        self.groups.iter().find(|g| g.strategy == strategy)
    }
}

fn dedup_in_order(tokens: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tokens
        .into_iter()
        .filter(|t| !t.is_empty() && seen.insert(t.clone()))
        .collect()
}

/// Tokenize document text for the index.
///
/// Returns the deduplicated token set in first-seen order. A failure anywhere
/// (e.g. a URL pattern that did not compile) yields an empty set: the document
/// is then indexed with empty content rather than dropped.
pub fn tokenize_for_indexing(text: &str, options: &TokenizeOptions) -> Vec<String> {
    match try_tokenize_for_indexing(text, options) {
        Ok(tokens) => tokens,
        Err(e) => {
            error!(error = %e, "tokenization failed, indexing document as empty");
            Vec::new()
        }
    }
}

fn try_tokenize_for_indexing(
    text: &str,
    options: &TokenizeOptions,
) -> Result<Vec<String>, TokenizeError> {
    let urls = if options.tokenize_urls {
        extract_urls(text)?
    } else {
        Vec::new()
    };

    let tokens: Vec<String> = split_tokens(text).into_iter().map(String::from).collect();

    let mut all = Vec::with_capacity(tokens.len() * 2);
    for token in &tokens {
        let single = std::slice::from_ref(token);
        all.push(token.clone());
        all.extend(Strategy::Hyphens.derive(text, single));
        if options.enabled(Strategy::CamelCase) {
            all.extend(Strategy::CamelCase.derive(text, single));
        }
    }
    all.extend(Strategy::Words.derive(text, &tokens));
    all.extend(urls);

    Ok(dedup_in_order(all))
}

/// Tokenize query text into the OR-of-ANDs search structure.
///
/// URLs are extracted first and their literal occurrences removed from the
/// text, then appended to the `Tokens` group whole. URL extraction is always
/// attempted at search time; a failure only costs the URL tokens.
pub fn tokenize_for_search(text: &str, options: &TokenizeOptions) -> DisjunctiveQuery {
    let urls = extract_urls(text).unwrap_or_else(|e| {
        warn!(error = %e, "url extraction failed for query");
        Vec::new()
    });
    let stripped = urls
        .iter()
        .fold(text.to_string(), |acc, url| acc.replace(url.as_str(), ""));

    let mut tokens: Vec<String> = split_tokens(&stripped).into_iter().map(String::from).collect();
    tokens.extend(urls);

    let groups = Strategy::ALL
        .into_iter()
        .filter(|s| options.enabled(*s))
        .map(|strategy| TermGroup {
            strategy,
            terms: dedup_in_order(strategy.derive(&stripped, &tokens)),
        })
        .collect();

    DisjunctiveQuery { groups }
}
