// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Text normalization: diacritics, Arabic letter folding, markdown emphasis.
//!
//! Two flavours of diacritic removal live here. [`remove_diacritics`] is the
//! string-level transform applied to index terms, query text and titles; it is
//! allowed to change the length of the text. [`fold_for_matching`] works one
//! character at a time and never changes the character count, so an offset
//! found in the folded copy points at the same character in the original.
//! Excerpts and highlights depend on that.
//!
//! ```text
//! "Café `x^2`"  ──remove_diacritics──▶  "Cafe `x^2`"
//! "Élan vital"  ──fold_for_matching──▶  "Elan vital"   (same char count)
//! ```

use regex::Regex;
use std::sync::LazyLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Marks that classify as diacritics but change meaning when dropped: the
/// Japanese prolonged sound mark and the combining (semi-)voiced sound marks.
const KEPT_MARKS: [char; 3] = ['\u{30FC}', '\u{309A}', '\u{3099}'];

/// Spacing characters that are diacritics in the Unicode sense but carry
/// meaning in notes: backticks delimit code spans, carets anchor patterns.
const PROTECTED: [char; 2] = ['`', '^'];

static EMPHASIS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(\*|_)+(.+?)(\*|_)+").ok());

/// Is this character a diacritic that search should ignore?
///
/// Combining marks only count inside the blocks that hold accents and
/// vocalization points. Devanagari or Telugu vowel signs are combining marks
/// too, but removing them destroys the word rather than an accent.
fn is_diacritic(c: char) -> bool {
    if KEPT_MARKS.contains(&c) {
        return false;
    }
    let combining_accent = is_combining_mark(c)
        && matches!(c,
            '\u{0300}'..='\u{036F}' |  // Combining Diacritical Marks
            '\u{0483}'..='\u{0487}' |  // Cyrillic titlo and palatalization
            '\u{0591}'..='\u{05C7}' |  // Hebrew points and cantillation
            '\u{064B}'..='\u{065F}' |  // Arabic harakat
            '\u{0670}' |
            '\u{06D6}'..='\u{06ED}' |  // Quranic annotation signs
            '\u{1AB0}'..='\u{1AFF}' |  // Combining Diacritical Marks Extended
            '\u{1DC0}'..='\u{1DFF}' |  // Combining Diacritical Marks Supplement
            '\u{20D0}'..='\u{20FF}' |  // Combining Diacritical Marks for Symbols
            '\u{3099}'..='\u{309A}' |
            '\u{FE20}'..='\u{FE2F}'    // Combining Half Marks
        );
    combining_accent
        || matches!(c,
            '^' | '`' | '\u{00A8}' | '\u{00AF}' | '\u{00B4}' | '\u{00B8}' |
            '\u{02B9}'..='\u{02FF}' |  // Spacing modifier letters
            '\u{0384}' | '\u{0385}'
        )
}

fn is_arabic_kept(c: char) -> bool {
    matches!(c,
        '\u{0621}'..='\u{063A}' |
        '\u{0641}'..='\u{064A}' |
        '\u{0660}'..='\u{0669}' |
        'a'..='z' | 'A'..='Z' | '0'..='9' | ' '
    )
}

/// Fold Arabic letter variants onto their bare forms.
fn fold_arabic_letter(c: char) -> char {
    match c {
        'آ' | 'إ' | 'أ' => 'ا',
        'ة' => 'ه',
        'ئ' | 'ؤ' => 'ء',
        'ى' => 'ي',
        _ => c,
    }
}

/// Strip diacritics from `text`.
///
/// NFD decomposes accented characters into base + marks, the marks are dropped,
/// and NFC recomposes what is left (Hangul syllables decompose into jamo under
/// NFD and must be put back together). Backticks and carets pass through.
///
/// With `arabic` set, characters outside Arabic letters, Arabic-Indic digits,
/// ASCII letters, ASCII digits and the space are removed first, and alef,
/// taa marbuta, hamza carriers and alef maksura are folded.
pub fn remove_diacritics(text: &str, arabic: bool) -> String {
    let folded;
    let text = if arabic {
        folded = text
            .chars()
            .filter(|&c| is_arabic_kept(c))
            .map(fold_arabic_letter)
            .collect::<String>();
        folded.as_str()
    } else {
        text
    };

    text.nfd()
        .filter(|&c| PROTECTED.contains(&c) || !is_diacritic(c))
        .nfc()
        .collect()
}

/// Fold a single character: strip its diacritics if what remains is exactly
/// one character, otherwise return it unchanged.
pub fn fold_char(c: char, arabic: bool) -> char {
    let c = if arabic { fold_arabic_letter(c) } else { c };
    if c.is_ascii() {
        return c;
    }
    let mut base = std::iter::once(c).nfd().filter(|&m| !is_diacritic(m));
    match (base.next(), base.next()) {
        (Some(b), None) => b,
        _ => c,
    }
}

/// Length-preserving diacritic folding used for match offsets.
pub fn fold_for_matching(text: &str, arabic: bool) -> String {
    text.chars().map(|c| fold_char(c, arabic)).collect()
}

/// Compose `text` (NFC) and drop combining marks that are not attached to a
/// base character, e.g. a mark at the start of the text or after a space.
///
/// Ingested content goes through this once so that later per-character
/// folding sees well-formed clusters.
pub fn remove_stray_diacritics(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut attached = false;
    for c in text.nfc() {
        if is_combining_mark(c) {
            if attached {
                out.push(c);
            }
            continue;
        }
        attached = !(c.is_whitespace() || c.is_control());
        out.push(c);
    }
    out
}

/// Remove paired `*`/`_` emphasis runs around a span, keeping the inner text.
///
/// `**bold**` becomes `bold`, `_a_ and _b_` becomes `a and b` (non-greedy).
pub fn strip_markdown_characters(text: &str) -> String {
    match EMPHASIS.as_ref() {
        Some(re) => re.replace_all(text, "$2").into_owned(),
        None => text.to_string(),
    }
}

/// Lowercase character by character, keeping the first char of each expansion
/// so the character count never changes ("İ" lowercases to two chars).
pub fn lowercase_aligned(text: &str) -> String {
    text.chars()
        .map(|c| c.to_lowercase().next().unwrap_or(c))
        .collect()
}
