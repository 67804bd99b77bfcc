// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Persistence: the cache blob codec, the stores it is written to, and the
//! in-memory cache of complete per-document entries.

mod blob;
mod entries;
mod store;

pub use blob::{CacheBlob, CacheError, SchemaVersion, FLAG_BROTLI, MAGIC, FOOTER_MAGIC};
pub use entries::EntryCache;
pub use store::{CacheStore, FileStore, MemoryStore};

/// Key the serialized index is stored under.
pub const INDEX_CACHE_KEY: &str = "sift-index";
