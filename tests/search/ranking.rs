//! Ranking: field weights, tags, recency, fuzziness, downranked folders.

use std::collections::BTreeMap;
use std::sync::Arc;

use sift::testing::{indexed_engine, MemorySpace};
use sift::{DocumentMeta, Fuzziness, RecencyCutoff, SearchEngine, Settings};

use crate::common::{days_ago, engine_with, ids, tagged};

fn score_of(engine: &SearchEngine, raw: &str, id: &str) -> f64 {
    engine
        .ranked_hits(&engine.parse_query(raw), None)
        .into_iter()
        .find(|h| h.id == id)
        .map(|h| h.score)
        .unwrap_or_else(|| panic!("{id} not ranked for {raw:?}"))
}

#[test]
fn test_basename_outranks_content() {
    let (engine, _) = engine_with(
        Settings::default(),
        &[("other.md", "a zebra in the text"), ("zebra.md", "nothing relevant")],
    );
    assert_eq!(ids(&engine, "zebra"), vec!["zebra.md", "other.md"]);
}

#[test]
fn test_exact_outranks_prefix() {
    let (engine, _) = engine_with(
        Settings::default(),
        &[("a.md", "notebook shelf"), ("b.md", "note shelf")],
    );
    assert_eq!(ids(&engine, "note"), vec!["b.md", "a.md"]);
}

#[test]
fn test_ties_break_by_id() {
    let (engine, _) = engine_with(
        Settings::default(),
        &[("c.md", "same words"), ("a.md", "same words"), ("b.md", "same words")],
    );
    assert_eq!(ids(&engine, "same"), vec!["a.md", "b.md", "c.md"]);
}

#[test]
fn test_tag_boost_ranks_tagged_strictly_above() {
    let space = Arc::new(MemorySpace::new());
    space.put("a.md", "project meeting notes");
    space.put_with_meta("b.md", "project meeting notes", tagged(&["project"]));
    let engine = indexed_engine(Settings::default(), &space);

    assert_eq!(ids(&engine, "#project"), vec!["b.md", "a.md"]);
    assert!(score_of(&engine, "#project", "b.md") > score_of(&engine, "#project", "a.md"));

    // without the tag in the query the two are indistinguishable
    let plain_a = score_of(&engine, "project", "a.md");
    let plain_b = score_of(&engine, "project", "b.md");
    assert!((plain_a - plain_b).abs() < 1e-9);
}

#[test]
fn test_tag_boost_is_case_insensitive() {
    let space = Arc::new(MemorySpace::new());
    space.put("a.md", "work items");
    space.put_with_meta("b.md", "work items", tagged(&["Work"]));
    let engine = indexed_engine(Settings::default(), &space);
    assert_eq!(ids(&engine, "#work"), vec!["b.md", "a.md"]);
}

#[test]
fn test_week_recency_prefers_recent() {
    let settings = Settings {
        recency_boost: RecencyCutoff::Week,
        ..Settings::default()
    };
    let space = Arc::new(MemorySpace::new());
    space.put_with_mtime("a-stale.md", "quarterly report draft", days_ago(60));
    space.put_with_mtime("b-fresh.md", "quarterly report draft", days_ago(1));
    let engine = indexed_engine(settings, &space);

    assert_eq!(ids(&engine, "quarterly"), vec!["b-fresh.md", "a-stale.md"]);
}

#[test]
fn test_recency_disabled_ignores_mtime() {
    let space = Arc::new(MemorySpace::new());
    space.put_with_mtime("a-stale.md", "quarterly report draft", days_ago(60));
    space.put_with_mtime("b-fresh.md", "quarterly report draft", days_ago(1));
    let engine = indexed_engine(Settings::default(), &space);

    assert_eq!(ids(&engine, "quarterly"), vec!["a-stale.md", "b-fresh.md"]);
}

#[test]
fn test_fuzziness_levels() {
    let docs = [("a.md", "an elephant walked by"), ("b.md", "a cat sat")];

    let high = Settings {
        fuzziness: Fuzziness::High,
        ..Settings::default()
    };
    let (engine, _) = engine_with(high, &docs);
    assert_eq!(ids(&engine, "elephent"), vec!["a.md"]);
    // three-char terms never go fuzzy
    assert!(ids(&engine, "cot").is_empty());

    let off = Settings {
        fuzziness: Fuzziness::Off,
        ..Settings::default()
    };
    let (engine, _) = engine_with(off, &docs);
    assert!(ids(&engine, "elephent").is_empty());
}

#[test]
fn test_fuzzy_hit_ranks_below_exact() {
    let high = Settings {
        fuzziness: Fuzziness::High,
        ..Settings::default()
    };
    let (engine, _) = engine_with(high, &[("a.md", "elephent"), ("b.md", "elephant")]);
    assert_eq!(ids(&engine, "elephant"), vec!["b.md", "a.md"]);
}

#[test]
fn test_downranked_folders_match_whole_names() {
    let docs = [
        ("archive.md", "lorem ipsum"),
        ("archive/x.md", "lorem ipsum"),
        ("notes/archive/y.md", "lorem ipsum"),
        ("archived/z.md", "lorem ipsum"),
        ("notes.md", "lorem ipsum"),
    ];
    let (baseline, _) = engine_with(Settings::default(), &docs);

    let partial = Settings {
        downranked_folders_filters: vec!["arch".into()],
        ..Settings::default()
    };
    let (engine, _) = engine_with(partial, &docs);
    for (id, _) in &docs {
        assert_eq!(score_of(&engine, "lorem", id), score_of(&baseline, "lorem", id), "{id}");
    }

    let whole = Settings {
        downranked_folders_filters: vec!["archive".into()],
        ..Settings::default()
    };
    let (engine, _) = engine_with(whole, &docs);
    for id in ["archive.md", "archive/x.md", "notes/archive/y.md"] {
        let expected = score_of(&baseline, "lorem", id) / 10.0;
        assert!((score_of(&engine, "lorem", id) - expected).abs() < 1e-9, "{id}");
    }
    for id in ["archived/z.md", "notes.md"] {
        assert_eq!(score_of(&engine, "lorem", id), score_of(&baseline, "lorem", id), "{id}");
    }
    assert_eq!(ids(&engine, "lorem")[..2], ["archived/z.md", "notes.md"]);
}

#[test]
fn test_custom_property_weight() {
    let settings = Settings {
        weight_custom_properties: BTreeMap::from([("status".to_string(), 5.0)]),
        ..Settings::default()
    };
    let space = Arc::new(MemorySpace::new());
    space.put("a.md", "urgent task list");
    let meta = DocumentMeta {
        custom_fields: BTreeMap::from([("status".to_string(), serde_json::json!("Urgent"))]),
        ..DocumentMeta::default()
    };
    space.put_with_meta("b.md", "urgent task list", meta);
    let engine = indexed_engine(settings, &space);

    assert_eq!(ids(&engine, "urgent"), vec!["b.md", "a.md"]);
    let ratio = score_of(&engine, "urgent", "b.md") / score_of(&engine, "urgent", "a.md");
    assert!((ratio - 5.0).abs() < 1e-9);
    // the property value must be a matched term
    assert_eq!(ids(&engine, "task"), vec!["a.md", "b.md"]);
}

#[test]
fn test_results_capped() {
    let docs: Vec<(String, String)> = (0..80)
        .map(|i| (format!("n{i:02}.md"), "common word".to_string()))
        .collect();
    let refs: Vec<(&str, &str)> = docs.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
    let (engine, _) = engine_with(Settings::default(), &refs);
    assert_eq!(ids(&engine, "common").len(), sift::scoring::ranking::MAX_RESULTS);
}
