// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Pure text transforms shared by the tokenizer, query parser and excerpts.

pub mod html;
pub mod normalize;

pub use html::{entity, escape_html};
pub use normalize::{
    fold_char, fold_for_matching, lowercase_aligned, remove_diacritics, remove_stray_diacritics,
    strip_markdown_characters,
};
