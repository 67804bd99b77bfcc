//! Index persistence through cache stores.

use std::sync::Arc;

use sift::cache::INDEX_CACHE_KEY;
use sift::testing::MemorySpace;
use sift::{CacheBlob, CacheStore, FileStore, MemoryStore, Providers, SchemaVersion, SearchEngine, Settings};
use tempfile::TempDir;

use crate::common::{ids, sample_space};

fn engine_over(space: &Arc<MemorySpace>, store: Arc<dyn CacheStore>) -> SearchEngine {
    SearchEngine::new(Settings::default(), Providers::from_one(Arc::clone(space)), store)
}

#[test]
fn test_reindex_persists_and_reloads() {
    let space = sample_space();
    let store = Arc::new(MemoryStore::new());

    let first = engine_over(&space, store.clone());
    let report = first.full_reindex();
    assert!(report.indexed > 0);
    assert!(store.get(INDEX_CACHE_KEY).unwrap().is_some());

    let second = engine_over(&space, store.clone());
    assert_eq!(second.document_count(), 0);
    assert!(second.load_from_cache());
    assert_eq!(second.document_count(), first.document_count());
    assert_eq!(second.term_count(), first.term_count());
    assert_eq!(ids(&second, "tomatoes"), ids(&first, "tomatoes"));
}

#[test]
fn test_incremental_updates_persist() {
    let space = sample_space();
    let store = Arc::new(MemoryStore::new());
    let first = engine_over(&space, store.clone());
    first.full_reindex();

    space.put("notes/new.md", "a zucchini recipe");
    assert!(first.index_one("notes/new.md"));
    assert!(first.delete_one("notes/cooking.md"));

    let second = engine_over(&space, store.clone());
    assert!(second.load_from_cache());
    assert!(second.is_indexed("notes/new.md"));
    assert!(!second.is_indexed("notes/cooking.md"));
    assert_eq!(ids(&second, "zucchini"), vec!["notes/new.md"]);
}

#[test]
fn test_missing_cache() {
    let engine = engine_over(&sample_space(), Arc::new(MemoryStore::new()));
    assert!(!engine.load_from_cache());
}

#[test]
fn test_corrupt_cache_is_dropped() {
    let store = Arc::new(MemoryStore::new());
    store.set(INDEX_CACHE_KEY, b"definitely not a cache blob").unwrap();

    let engine = engine_over(&sample_space(), store.clone());
    assert!(!engine.load_from_cache());
    assert!(store.get(INDEX_CACHE_KEY).unwrap().is_none());
}

#[test]
fn test_flipped_byte_is_dropped() {
    let space = sample_space();
    let store = Arc::new(MemoryStore::new());
    engine_over(&space, store.clone()).full_reindex();

    let mut bytes = store.get(INDEX_CACHE_KEY).unwrap().unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0xFF;
    store.set(INDEX_CACHE_KEY, &bytes).unwrap();

    assert!(!engine_over(&space, store.clone()).load_from_cache());
    assert!(store.is_empty());
}

#[test]
fn test_old_schema_forces_rebuild() {
    let space = sample_space();
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(&space, store.clone());
    engine.full_reindex();

    let current = CacheBlob::decode(&store.get(INDEX_CACHE_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(current.schema_version, SchemaVersion::CURRENT);
    let old = CacheBlob {
        schema_version: SchemaVersion::V1,
        serialized_index: current.serialized_index,
    };
    store.set(INDEX_CACHE_KEY, &old.encode().unwrap()).unwrap();

    let reloaded = engine_over(&space, store.clone());
    assert!(!reloaded.load_from_cache());
    assert!(store.get(INDEX_CACHE_KEY).unwrap().is_none());
    assert_eq!(reloaded.document_count(), 0);
}

#[test]
fn test_file_store_survives_engines() {
    let dir = TempDir::new().unwrap();
    let space = sample_space();

    let first = engine_over(&space, Arc::new(FileStore::open(dir.path()).unwrap()));
    first.full_reindex();
    assert!(dir.path().join(format!("{INDEX_CACHE_KEY}.bin")).exists());

    let second = engine_over(&space, Arc::new(FileStore::open(dir.path()).unwrap()));
    assert!(second.load_from_cache());
    assert_eq!(second.document_count(), first.document_count());

    second.invalidate_cache();
    let third = engine_over(&space, Arc::new(FileStore::open(dir.path()).unwrap()));
    assert!(!third.load_from_cache());
}
