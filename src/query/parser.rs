// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Query lexer.
//!
//! Splits on whitespace, keeping quoted spans together:
//!
//! ```text
//! "hello world" -draft ext:md,pdf path:"my notes" .canvas
//! └──Quoted───┘ └Bare┘ └─Bare───┘ └────Bare───────┘ └Bare─┘
//! ```
//!
//! Nothing here fails. An unterminated quote lexes as a bare token and an
//! unknown `key:value` is free text.

use super::{KEYWORDS, Keyword};

/// A lexed query fragment, before keyword/text classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Fragment {
    Text { value: String, negated: bool },
    Keyword { key: Keyword, values: Vec<String>, negated: bool },
}

/// Split raw query text into whitespace-delimited fragments.
pub(crate) fn lex(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        let mut end = bare_end(&chars, i);

        // `"...`, `-"...` or `key:"...`: extend to the closing quote if there is one.
        if let Some(q) = quote_start(&chars[start..end]) {
            if let Some(close) = closing_quote(&chars, start + q) {
                end = close + 1;
            }
        }

        out.push(chars[start..end].iter().collect());
        i = end;
    }
    out
}

fn bare_end(chars: &[char], from: usize) -> usize {
    let mut end = from;
    while end < chars.len() && !chars[end].is_whitespace() {
        end += 1;
    }
    end
}

/// Index of the opening quote inside a fragment that starts a quoted span.
fn quote_start(fragment: &[char]) -> Option<usize> {
    let skip = usize::from(fragment.first() == Some(&'-'));
    if matches!(fragment.get(skip), Some('"' | '\'')) {
        return Some(skip);
    }
    let colon = fragment.iter().position(|&c| c == ':')?;
    matches!(fragment.get(colon + 1), Some('"' | '\'')).then_some(colon + 1)
}

/// Position of the quote closing the one at `open`, honouring backslash escapes.
fn closing_quote(chars: &[char], open: usize) -> Option<usize> {
    let quote = chars[open];
    let mut i = open + 1;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            c if c == quote => return Some(i),
            _ => i += 1,
        }
    }
    None
}

/// Drop backslashes, keeping the escaped char.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Strip one leading and one trailing quote, independently.
fn strip_quotes(s: &str) -> &str {
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    s.strip_suffix(['"', '\'']).unwrap_or(s)
}

/// Classify a lexed fragment as a keyword filter or free text.
pub(crate) fn classify(fragment: &str) -> Fragment {
    let (negated, body) = match fragment.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, fragment),
    };

    if let Some((key, value)) = body.split_once(':') {
        if let Some(&(_, keyword)) = KEYWORDS.iter().find(|(name, _)| *name == key.trim()) {
            let value = unescape(strip_quotes(value.trim()));
            let values = value
                .split(',')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_lowercase)
                .collect();
            return Fragment::Keyword {
                key: keyword,
                values,
                negated,
            };
        }
    }

    Fragment::Text {
        value: strip_quotes(&unescape(body)).to_string(),
        negated,
    }
}

/// Quoted spans of `text`, quotes removed. Only double quotes delimit phrases.
pub(crate) fn quoted_phrases(text: &str) -> Vec<String> {
    text.split('"')
        .enumerate()
        .filter(|(i, _)| i % 2 == 1)
        .map(|(_, s)| s)
        .take(text.matches('"').count() / 2)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
