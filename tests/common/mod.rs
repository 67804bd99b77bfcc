//! Shared test utilities and fixtures.

#![allow(dead_code)]

use std::sync::Arc;

use sift::testing::{indexed_engine, MemorySpace};
use sift::{DocumentMeta, ResultPage, SearchEngine, Settings};

// Re-export canonical test utilities from sift::testing
pub use sift::testing::{engine_with, make_doc};

pub const DAY_MS: i64 = 24 * 3600 * 1000;

/// Milliseconds since the epoch, `days` ago.
pub fn days_ago(days: i64) -> i64 {
    chrono::Utc::now().timestamp_millis() - days * DAY_MS
}

/// Metadata carrying only tags.
pub fn tagged(tags: &[&str]) -> DocumentMeta {
    DocumentMeta {
        tags: tags.iter().map(|t| t.to_string()).collect(),
        ..DocumentMeta::default()
    }
}

/// A small vault with a bit of everything.
pub fn sample_space() -> Arc<MemorySpace> {
    let space = Arc::new(MemorySpace::new());
    space.put(
        "notes/gardening.md",
        "# Gardening\n\nTomatoes need sun. Water the tomatoes every morning.",
    );
    space.put("notes/cooking.md", "Tomato soup with basil and garlic.");
    space.put("journal/2024-05-01.md", "Planted tomatoes today. Weather was great.");
    space.put("archive/old-garden.md", "Old garden plans with tomatoes and beans.");
    space.put("canvas/board.canvas", "tomatoes board");
    space.put_with_meta("projects/kitchen.md", "Kitchen remodel project", tagged(&["project"]));
    space
}

pub fn sample_engine(settings: Settings) -> SearchEngine {
    indexed_engine(settings, &sample_space())
}

/// Run a raw query and return result ids in rank order.
pub fn ids(engine: &SearchEngine, raw: &str) -> Vec<String> {
    engine
        .search(&engine.parse_query(raw), None)
        .into_iter()
        .map(|page| page.document.id)
        .collect()
}

pub fn page<'a>(results: &'a [ResultPage], id: &str) -> &'a ResultPage {
    results
        .iter()
        .find(|p| p.document.id == id)
        .unwrap_or_else(|| panic!("{id} not in results"))
}
