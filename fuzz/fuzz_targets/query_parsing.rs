// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for query parsing and search tokenization.
//!
//! Raw query text comes straight from a search box. Unbalanced quotes, stray
//! keywords, emoji and null bytes must all parse into something searchable
//! (or into nothing), never into a panic.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sift::{tokenize_for_search, ParseOptions, Query, TokenizeOptions};

fuzz_target!(|raw: &[u8]| {
    let raw = String::from_utf8_lossy(raw);
    // Cap length to avoid timeouts
    let raw: String = raw.chars().take(500).collect();

    for ignore_diacritics in [false, true] {
        let query = Query::parse(
            &raw,
            ParseOptions {
                ignore_diacritics,
                ignore_arabic_diacritics: ignore_diacritics,
            },
        );

        assert_eq!(query.is_empty(), query.text_terms.is_empty());

        // the best string is a phrase or the whole free text
        let best = query.best_string_for_excerpt();
        assert!(best == query.segments_to_str() || query.exact_phrases.contains(&best));
        let _ = query.exact_terms();

        let tokens = tokenize_for_search(&query.segments_to_str(), &TokenizeOptions::default());
        for group in &tokens.groups {
            assert!(group.terms.iter().all(|t| !t.is_empty()));
        }
    }
});
