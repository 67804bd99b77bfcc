// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The splitting rule table.
//!
//! Every token the engine ever sees comes out of one of four strategies.
//! Indexing takes the union of all of them; searching builds one AND-group per
//! strategy and ORs the groups together, so a query matches when any single
//! strategy's tokens are all present.
//!
//! | Strategy    | Splits on                                   | `fooBar-baz (x)` |
//! |-------------|---------------------------------------------|------------------|
//! | `Tokens`    | whitespace and punctuation (not `-$+~`)     | `fooBar-baz`, `x` |
//! | `Words`     | whitespace and brackets only                | `fooBar-baz`, `x` |
//! | `Hyphens`   | `-` inside each `Tokens` token              | `fooBar`, `baz`  |
//! | `CamelCase` | lower→upper transitions in each token       | `foo`, `Bar-baz` |

use serde::{Deserialize, Serialize};

/// A token splitting strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Strategy {
    Tokens,
    Words,
    Hyphens,
    CamelCase,
}

impl Strategy {
    /// Search groups are emitted in this order.
    pub const ALL: [Strategy; 4] = [
        Strategy::Tokens,
        Strategy::Words,
        Strategy::Hyphens,
        Strategy::CamelCase,
    ];

    /// Terms this strategy derives from `text`, given its punctuation-level
    /// `tokens` (the `Tokens` output, possibly extended with URLs).
    pub fn derive(self, text: &str, tokens: &[String]) -> Vec<String> {
        match self {
            Strategy::Tokens => tokens.to_vec(),
            Strategy::Words => split_words(text).into_iter().map(str::to_string).collect(),
            Strategy::Hyphens => tokens.iter().flat_map(|t| split_hyphens(t)).collect(),
            Strategy::CamelCase => tokens.iter().flat_map(|t| split_camel_case(t)).collect(),
        }
    }
}

/// Token separator: whitespace and punctuation.
///
/// ASCII `-`, `$`, `+` and `~` are deliberately not separators: hyphenated
/// words stay whole here and get their own `Hyphens` strategy.
pub fn is_separator(c: char) -> bool {
    if c.is_ascii() {
        return c.is_ascii_whitespace()
            || (c.is_ascii_punctuation() && !matches!(c, '-' | '$' | '+' | '~'));
    }
    c.is_whitespace()
        || matches!(c,
            '\u{00A0}' | '\u{00A1}' | '\u{00A7}' | '\u{00AB}' | '\u{00B6}' | '\u{00B7}' |
            '\u{00BB}' | '\u{00BF}' | '\u{037E}' | '\u{0387}' |
            '\u{055A}'..='\u{055F}' | '\u{0589}' | '\u{05C0}' | '\u{05C3}' | '\u{05C6}' |
            '\u{05F3}' | '\u{05F4}' | '\u{0609}' | '\u{060A}' | '\u{060C}' | '\u{060D}' |
            '\u{061B}' | '\u{061E}' | '\u{061F}' | '\u{066A}'..='\u{066D}' | '\u{06D4}' |
            '\u{0964}' | '\u{0965}' | '\u{0970}' | '\u{0E4F}' | '\u{0E5A}' | '\u{0E5B}' |
            '\u{2000}'..='\u{206F}' |  // General Punctuation (incl. Unicode hyphens)
            '\u{2308}'..='\u{230B}' | '\u{2329}' | '\u{232A}' | '\u{2768}'..='\u{2775}' |
            '\u{27E6}'..='\u{27EF}' | '\u{2983}'..='\u{2998}' | '\u{2E00}'..='\u{2E4F}' |
            '\u{3000}'..='\u{3003}' | '\u{3008}'..='\u{3011}' | '\u{3014}'..='\u{301F}' |
            '\u{3030}' | '\u{303D}' | '\u{30A0}' | '\u{30FB}' |
            '\u{FE10}'..='\u{FE19}' | '\u{FE30}'..='\u{FE52}' | '\u{FE54}'..='\u{FE61}' |
            '\u{FF01}'..='\u{FF03}' | '\u{FF05}'..='\u{FF0A}' | '\u{FF0C}'..='\u{FF0F}' |
            '\u{FF1A}' | '\u{FF1B}' | '\u{FF1F}' | '\u{FF20}' | '\u{FF3B}'..='\u{FF3D}' |
            '\u{FF3F}' | '\u{FF5B}' | '\u{FF5D}' | '\u{FF5F}'..='\u{FF65}'
        )
}

/// Word separator: whitespace and brackets.
pub fn is_word_break(c: char) -> bool {
    matches!(c, '|' | '[' | ']' | '(' | ')' | '<' | '>' | '{' | '}' | ' ' | '\t' | '\n' | '\r')
}

/// Punctuation-level tokens, empty pieces dropped.
pub fn split_tokens(text: &str) -> Vec<&str> {
    text.split(is_separator).filter(|t| !t.is_empty()).collect()
}

/// Whitespace/bracket-level words, empty pieces dropped.
pub fn split_words(text: &str) -> Vec<&str> {
    text.split(is_word_break).filter(|t| !t.is_empty()).collect()
}

/// Split on hyphens. Returns nothing when there is no hyphen, so callers can
/// tell "no variant" apart from "the token itself".
pub fn split_hyphens(text: &str) -> Vec<String> {
    if !text.contains('-') {
        return Vec::new();
    }
    text.split('-')
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Split at every lowercase→uppercase transition. Returns nothing when the
/// text has no such transition.
pub fn split_camel_case(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    let mut split = false;

    for c in text.chars() {
        if prev_lower && c.is_uppercase() {
            parts.push(std::mem::take(&mut current));
            split = true;
        }
        current.push(c);
        prev_lower = c.is_lowercase();
    }

    if !split {
        return Vec::new();
    }
    parts.push(current);
    parts.retain(|p| !p.is_empty());
    parts
}
