// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for bounded edit distance.
//!
//! The early exits must never change the answer: a distance is reported
//! exactly when it is within the bound, and it is the same both ways round.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sift::fuzzy::bounded_edit_distance;

#[derive(Debug, Arbitrary)]
struct DistanceInput {
    a: String,
    b: String,
    max: u8,
}

fuzz_target!(|input: DistanceInput| {
    // Cap lengths to avoid timeouts
    let a: String = input.a.chars().take(40).collect();
    let b: String = input.b.chars().take(40).collect();
    let max = usize::from(input.max % 8);

    let forward = bounded_edit_distance(&a, &b, max);
    assert_eq!(forward, bounded_edit_distance(&b, &a, max));
    assert_eq!(bounded_edit_distance(&a, &a, max), Some(0));

    if let Some(d) = forward {
        assert!(d <= max);
        // a looser bound sees the same distance
        assert_eq!(bounded_edit_distance(&a, &b, max + 1), Some(d));
    }
});
