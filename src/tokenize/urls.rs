// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Markdown link extraction.
//!
//! Pulls link targets out of inline links (`[text](url "title")`, images too),
//! angle-bracket autolinks (`<https://…>`) and bare URLs (`https://…`,
//! `www.…`). URLs are indexed as whole tokens so that punctuation inside them
//! does not fragment a query.

use regex::Regex;
use std::sync::LazyLock;

use super::TokenizeError;

static INLINE_LINK: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"\[[^\]]*\]\(\s*<?([^\s()<>]+)>?(?:\s+(?:"[^"]*"|'[^']*'))?\s*\)"#).ok()
});

static AUTOLINK: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"<((?:https?|ftp)://[^\s<>]+|mailto:[^\s<>]+)>").ok());

static BARE_URL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?:https?://|www\.)[^\s<>()\[\]"']+"#).ok());

/// Trailing characters that end a sentence rather than a bare URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Extract link targets in order of first appearance, deduplicated.
pub fn extract_urls(text: &str) -> Result<Vec<String>, TokenizeError> {
    let inline = INLINE_LINK
        .as_ref()
        .ok_or(TokenizeError::Pattern("inline link"))?;
    let autolink = AUTOLINK.as_ref().ok_or(TokenizeError::Pattern("autolink"))?;
    let bare = BARE_URL.as_ref().ok_or(TokenizeError::Pattern("bare url"))?;

    // (position, url) so the three passes interleave in document order
    let mut found: Vec<(usize, String)> = Vec::new();

    for caps in inline.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            found.push((m.start(), m.as_str().to_string()));
        }
    }
    for caps in autolink.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            found.push((m.start(), m.as_str().to_string()));
        }
    }
    for m in bare.find_iter(text) {
        let url = m.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        if !url.is_empty() {
            found.push((m.start(), url.to_string()));
        }
    }

    found.sort_by_key(|(pos, _)| *pos);

    let mut seen = std::collections::HashSet::new();
    Ok(found
        .into_iter()
        .map(|(_, url)| url)
        .filter(|url| seen.insert(url.clone()))
        .collect())
}
