// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Fuzz target for cache blob decoding.
//!
//! The cache lives on disk between runs and may be truncated, stale or
//! written by a different version. Decoding arbitrary bytes must fail
//! cleanly, and anything that does decode must restore or fail cleanly too.

#![no_main]

use libfuzzer_sys::fuzz_target;
use sift::{CacheBlob, IndexOptions, InvertedIndex};

fuzz_target!(|data: &[u8]| {
    let Ok(blob) = CacheBlob::decode(data) else {
        return;
    };

    // a decoded blob re-encodes to something that decodes to the same blob
    if let Ok(encoded) = blob.encode() {
        let again = CacheBlob::decode(&encoded).expect("re-encoded blob must decode");
        assert_eq!(again, blob);
    }

    if let Ok(index) = InvertedIndex::restore(&blob.serialized_index, IndexOptions::default()) {
        let _ = index.len();
        let _ = index.term_count();
    }
});
