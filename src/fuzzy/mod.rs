// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzzy matching: typo tolerance via bounded edit distance.
//!
//! The index vocabulary for a personal note collection is small enough that a
//! linear scan with an early-exit Levenshtein beats building an automaton.

mod levenshtein;

pub use levenshtein::{bounded_edit_distance, levenshtein_within};
