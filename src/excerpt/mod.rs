// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Excerpts: where the query matched, and what to show around it.
//!
//! - [`get_matches`] finds match offsets in a document's cleaned content
//! - [`get_groups`] clusters nearby matches into excerpt-sized groups
//! - [`make_excerpt`] cuts an escaped window around an offset
//! - [`highlight_text`] wraps matches in highlight spans

mod groups;
mod highlight;
mod matches;
mod window;

pub use groups::{get_groups, MAX_GROUP_ITERATIONS};
pub use highlight::{highlight_text, HIGHLIGHT_CLASS};
pub use matches::{get_matches, MatchOptions, MAX_MATCHES, MATCH_TIME_BUDGET};
pub use window::{make_excerpt, ExcerptOptions};

/// Chars of context kept before a match.
pub const EXCERPT_BEFORE: usize = 100;

/// Chars of context kept after a match; also the width of a match group.
pub const EXCERPT_AFTER: usize = 300;
