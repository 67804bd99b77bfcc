// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Clustering matches into excerpt-sized groups.

use crate::types::SearchMatch;

use super::EXCERPT_AFTER;

/// Groups built per call, at most.
pub const MAX_GROUP_ITERATIONS: usize = 100;

/// Bundle matches that fit in one excerpt window.
///
/// Each group starts at the first match past the previous group's last
/// offset and takes every later match within [`EXCERPT_AFTER`] chars of it.
pub fn get_groups(matches: &[SearchMatch]) -> Vec<Vec<SearchMatch>> {
    let mut groups = Vec::new();
    let mut last: Option<usize> = None;

    for _ in 0..MAX_GROUP_ITERATIONS {
        let after = |m: &&SearchMatch| last.map_or(true, |l| m.offset > l);
        let Some(first) = matches.iter().find(after) else {
            break;
        };
        let limit = first.offset + EXCERPT_AFTER;
        let group: Vec<SearchMatch> = matches
            .iter()
            .filter(after)
            .filter(|m| m.offset <= limit)
            .cloned()
            .collect();
        last = group.last().map(|m| m.offset);
        groups.push(group);
    }
    groups
}
