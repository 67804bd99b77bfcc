// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for match offsets, excerpts and highlighting.
//!
//! Offsets index the source text by char while matching runs over an escaped,
//! folded copy of it. Any drift between the two shows up here as an offset
//! past the end or a match string that is not at its offset.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sift::util::escape_html;
use sift::{get_groups, get_matches, highlight_text, make_excerpt, ExcerptOptions, MatchOptions};

#[derive(Debug, Arbitrary)]
struct MatchInput {
    content: String,
    words: Vec<String>,
    ignore_diacritics: bool,
    render_line_returns: bool,
}

fuzz_target!(|input: MatchInput| {
    // Cap sizes to avoid timeouts
    let content: String = input.content.chars().take(2000).collect();
    let words: Vec<String> = input
        .words
        .into_iter()
        .take(8)
        .map(|w| w.chars().take(30).collect())
        .collect();

    let options = MatchOptions {
        ignore_diacritics: input.ignore_diacritics,
        ignore_arabic_diacritics: false,
    };
    let chars: Vec<char> = content.chars().collect();
    let matches = get_matches(&content, &words, None, &options);

    for m in &matches {
        assert!(m.offset < chars.len(), "offset {} past {} chars", m.offset, chars.len());
        assert!(!m.text.is_empty());
    }

    let flattened: usize = get_groups(&matches).iter().map(Vec::len).sum();
    assert!(flattened <= matches.len());

    let excerpt_options = ExcerptOptions {
        render_line_returns: input.render_line_returns,
    };
    let excerpt = make_excerpt(&content, matches.first().map(|m| m.offset), &excerpt_options);
    let highlighted = highlight_text(&excerpt, &matches);
    assert!(highlighted.len() >= excerpt.len());

    let escaped = escape_html(&content);
    let _ = highlight_text(&escaped, &matches);
});
