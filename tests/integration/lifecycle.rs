//! Engine startup: cache load or rebuild, and the queue of early mutations.

use std::sync::Arc;
use std::thread;

use sift::testing::MemorySpace;
use sift::{
    CacheStore, EngineHandle, EngineState, MemoryStore, PendingAction, Providers, SearchEngine,
    Settings,
};

fn handle_over(space: &Arc<MemorySpace>, store: &Arc<MemoryStore>) -> EngineHandle {
    let store: Arc<dyn CacheStore> = store.clone();
    EngineHandle::new(SearchEngine::new(
        Settings::default(),
        Providers::from_one(Arc::clone(space)),
        store,
    ))
}

fn result_ids(handle: &EngineHandle, raw: &str) -> Vec<String> {
    handle.search(raw).into_iter().map(|p| p.document.id).collect()
}

#[test]
fn test_mutations_queue_until_ready() {
    let space = Arc::new(MemorySpace::new());
    space.put("a.md", "apple pie");
    let handle = handle_over(&space, &Arc::new(MemoryStore::new()));

    handle.index("b.md");
    handle.delete("a.md");
    assert_eq!(handle.state(), EngineState::Uninitialized);
    assert!(handle.engine().is_none());
    assert_eq!(
        handle.pending(),
        vec![PendingAction::Index("b.md".into()), PendingAction::Delete("a.md".into())]
    );

    let engine = handle.ensure_initialized();
    assert_eq!(handle.state(), EngineState::Ready);
    assert!(handle.pending().is_empty());
    // the queued delete wins over the rebuild that indexed a.md
    assert!(!engine.is_indexed("a.md"));
}

#[test]
fn test_queue_replays_over_cached_index() {
    let space = Arc::new(MemorySpace::new());
    let store = Arc::new(MemoryStore::new());
    space.put("a.md", "apple pie");
    handle_over(&space, &store).ensure_initialized();

    // a document the cached index has never seen
    space.put("b.md", "banana bread");
    let handle = handle_over(&space, &store);
    handle.index("b.md");

    assert_eq!(result_ids(&handle, "banana"), vec!["b.md"]);
    assert_eq!(result_ids(&handle, "apple"), vec!["a.md"]);
}

#[test]
fn test_cached_index_is_used_without_rebuild() {
    let space = Arc::new(MemorySpace::new());
    let store = Arc::new(MemoryStore::new());
    space.put("a.md", "apple pie");
    handle_over(&space, &store).ensure_initialized();

    // not listed at rebuild time, so only a cache load explains a hit
    space.remove("a.md");
    space.put("c.md", "cherry tart");
    let handle = handle_over(&space, &store);
    let engine = handle.ensure_initialized();
    assert!(engine.is_indexed("a.md"));
    assert!(!engine.is_indexed("c.md"));
}

#[test]
fn test_ready_handle_applies_immediately() {
    let space = Arc::new(MemorySpace::new());
    space.put("a.md", "apple pie");
    let handle = handle_over(&space, &Arc::new(MemoryStore::new()));
    handle.ensure_initialized();

    space.put("d.md", "date squares");
    handle.index("d.md");
    assert!(handle.pending().is_empty());
    assert_eq!(result_ids(&handle, "date"), vec!["d.md"]);

    handle.delete("d.md");
    assert!(result_ids(&handle, "date").is_empty());
}

#[test]
fn test_concurrent_searches_initialize_once() {
    let space = Arc::new(MemorySpace::new());
    for i in 0..20 {
        space.put(&format!("n{i}.md"), "shared fruit salad");
    }
    let handle = handle_over(&space, &Arc::new(MemoryStore::new()));

    thread::scope(|s| {
        let workers: Vec<_> = (0..8).map(|_| s.spawn(|| handle.search("fruit").len())).collect();
        for worker in workers {
            assert_eq!(worker.join().unwrap(), 20);
        }
    });
    assert_eq!(handle.state(), EngineState::Ready);
}
