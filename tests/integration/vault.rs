//! End to end over a directory vault with a file-backed cache.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use sift::{
    DocumentMeta, DocumentSource, EngineHandle, ExtractionHook, FileStore, ProviderError,
    Providers, SearchEngine, Settings, Vault,
};
use tempfile::TempDir;

const PLAN: &str = "---\ntags: [project]\ndisplayName: Grand Scheme\n---\nRockets and fuel.\n";

fn write(root: &Path, id: &str, content: &[u8]) {
    let path = root.join(id);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn sample_vault() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    write(root, "notes/plan.md", PLAN.as_bytes());
    write(root, "notes/other.md", b"A scheme for fuel savings.");
    write(root, "readme.txt", b"plain text about rockets");
    write(root, ".hidden/secret.md", b"rockets in hiding");
    write(root, "docs/manual.pdf", b"%PDF-1.4 binary");
    dir
}

fn engine(vault: Vault) -> SearchEngine {
    let cache = FileStore::open(vault.root().join(".sift")).unwrap();
    SearchEngine::new(Settings::default(), Providers::from_one(Arc::new(vault)), Arc::new(cache))
}

fn ids(engine: &SearchEngine, raw: &str) -> Vec<String> {
    engine
        .search(&engine.parse_query(raw), None)
        .into_iter()
        .map(|p| p.document.id)
        .collect()
}

fn sorted(mut ids: Vec<String>) -> Vec<String> {
    ids.sort();
    ids
}

struct FakePdf;

impl ExtractionHook for FakePdf {
    fn extract(&self, id: &str, _meta: &DocumentMeta) -> Result<Vec<Value>, ProviderError> {
        Ok(vec![json!({
            "content": format!("extracted handbook text from {id}"),
            "navigationMap": [{"from": 0, "to": 1000, "tail": "#page=1"}],
        })])
    }
}

struct BrokenHook;

impl ExtractionHook for BrokenHook {
    fn extract(&self, id: &str, _meta: &DocumentMeta) -> Result<Vec<Value>, ProviderError> {
        Err(ProviderError::Extraction {
            id: id.to_string(),
            message: "no handler".into(),
        })
    }
}

#[test]
fn test_listing_skips_hidden_entries() {
    let dir = sample_vault();
    let ids = Vault::open(dir.path()).unwrap().list().unwrap();
    assert_eq!(ids, vec!["docs/manual.pdf", "notes/other.md", "notes/plan.md", "readme.txt"]);
}

#[test]
fn test_index_and_search_vault() {
    let dir = sample_vault();
    let engine = engine(Vault::open(dir.path()).unwrap());

    let report = engine.full_reindex();
    assert_eq!(report.indexed, 3);
    assert_eq!(report.skipped, 1);
    assert!(!engine.is_indexed("docs/manual.pdf"));

    assert_eq!(sorted(ids(&engine, "rockets")), vec!["notes/plan.md", "readme.txt"]);
    // display name outweighs a mention in the body
    assert_eq!(ids(&engine, "scheme")[0], "notes/plan.md");
    assert_eq!(ids(&engine, "#project"), vec!["notes/plan.md"]);

    let results = engine.search(&engine.parse_query("fuel"), None);
    let plan = results.iter().find(|p| p.document.id == "notes/plan.md").unwrap();
    assert_eq!(plan.document.display_name, "Grand Scheme");
    assert_eq!(plan.document.tags, vec!["#project"]);
    assert!(plan.document.last_modified > 0);
}

#[test]
fn test_hook_extracts_other_formats() {
    let dir = sample_vault();
    let engine = engine(Vault::open(dir.path()).unwrap().with_hook(Arc::new(FakePdf)));
    engine.full_reindex();

    let results = engine.search(&engine.parse_query("handbook"), None);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document.id, "docs/manual.pdf");
    let map = results[0].navigation_map.as_ref().unwrap();
    assert_eq!(sift::solve_navigation_map(map, results[0].matches[0].offset), Some("#page=1"));
}

#[test]
fn test_failing_hook_skips_document() {
    let dir = sample_vault();
    let engine = engine(Vault::open(dir.path()).unwrap().with_hook(Arc::new(BrokenHook)));
    let report = engine.full_reindex();
    assert_eq!(report.indexed, 3);
    assert!(!engine.is_indexed("docs/manual.pdf"));
}

#[test]
fn test_edits_are_picked_up() {
    let dir = sample_vault();
    let engine = engine(Vault::open(dir.path()).unwrap());
    engine.full_reindex();
    assert!(ids(&engine, "hydrogen").is_empty());

    write(dir.path(), "notes/other.md", b"Hydrogen is a fuel too.");
    assert!(engine.index_one("notes/other.md"));
    assert_eq!(ids(&engine, "hydrogen"), vec!["notes/other.md"]);
    assert!(!ids(&engine, "savings").contains(&"notes/other.md".to_string()));

    fs::remove_file(dir.path().join("readme.txt")).unwrap();
    assert!(engine.delete_one("readme.txt"));
    assert_eq!(ids(&engine, "rockets"), vec!["notes/plan.md"]);
}

#[test]
fn test_cache_dir_reused_across_runs() {
    let dir = sample_vault();
    engine(Vault::open(dir.path()).unwrap()).full_reindex();
    assert!(dir.path().join(".sift").join("sift-index.bin").exists());

    let handle = EngineHandle::new(engine(Vault::open(dir.path()).unwrap()));
    let results: Vec<String> = handle.search("rockets").into_iter().map(|p| p.document.id).collect();
    assert_eq!(sorted(results), vec!["notes/plan.md", "readme.txt"]);
}

#[test]
fn test_missing_root() {
    let dir = TempDir::new().unwrap();
    assert!(Vault::open(dir.path().join("absent")).is_err());
}
