// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Wrapping matches in highlight markup.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::types::SearchMatch;

use super::matches::alternation;

/// CSS class on every highlight span.
pub const HIGHLIGHT_CLASS: &str = "sift-highlight";

/// Markup the excerpt builder emits; a highlight never starts or ends inside it.
static IGNORED: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(<br>|&lt;|&gt;|&quot;|&#039;|&amp;)").ok());

/// Wrap every occurrence of the match strings in `text` with a highlight span.
///
/// `text` is expected to be HTML-escaped already; match strings are escaped
/// source text and are inserted as-is, so a match may contain entities. An
/// occurrence that would cut through an entity or `<br>` is skipped.
pub fn highlight_text(text: &str, matches: &[SearchMatch]) -> String {
    let words: Vec<String> = matches.iter().map(|m| m.text.clone()).collect();
    if words.iter().all(String::is_empty) {
        return text.to_string();
    }
    let regex = match alternation(&words) {
        Ok(regex) => regex,
        Err(e) => {
            warn!(error = %e, "highlight pattern failed to compile");
            return text.to_string();
        }
    };
    let Some(ignored) = IGNORED.as_ref() else {
        return text.to_string();
    };
    let protected: Vec<(usize, usize)> = ignored
        .find_iter(text)
        .map(|m| (m.start(), m.end()))
        .collect();
    let cuts_markup = |at: usize| protected.iter().any(|&(start, end)| start < at && at < end);

    let mut out = String::with_capacity(text.len());
    let mut copied = 0;
    let mut cursor = 0;
    while let Some(m) = regex.find_at(text, cursor) {
        if m.start() == m.end() || cuts_markup(m.start()) || cuts_markup(m.end()) {
            // retry one char further on
            cursor = m.start() + text[m.start()..].chars().next().map_or(1, char::len_utf8);
            if cursor > text.len() {
                break;
            }
            continue;
        }
        out.push_str(&text[copied..m.start()]);
        out.push_str(&format!(r#"<span class="{}">{}</span>"#, HIGHLIGHT_CLASS, m.as_str()));
        copied = m.end();
        cursor = m.end();
    }
    out.push_str(&text[copied..]);
    out
}
