//! Keyword filters, exclusions, exact phrases and single-document mode.

use sift::Settings;

use crate::common::{engine_with, ids, sample_engine};

#[test]
fn test_empty_queries_return_nothing() {
    let engine = sample_engine(Settings::default());
    assert!(ids(&engine, "").is_empty());
    assert!(ids(&engine, "   ").is_empty());
    assert!(ids(&engine, "ext:md").is_empty());
    assert!(ids(&engine, "-tomato").is_empty());
}

#[test]
fn test_extension_filters() {
    let engine = sample_engine(Settings::default());

    let all = ids(&engine, "tomatoes");
    assert!(all.contains(&"canvas/board.canvas".to_string()));

    let md = ids(&engine, "tomatoes ext:md");
    assert!(!md.is_empty());
    assert!(md.iter().all(|id| id.ends_with(".md")));

    assert_eq!(ids(&engine, "tomatoes .canvas"), vec!["canvas/board.canvas"]);
    assert_eq!(ids(&engine, "tomatoes ext:can"), vec!["canvas/board.canvas"]);
    assert_eq!(ids(&engine, "tomatoes -ext:md"), vec!["canvas/board.canvas"]);
}

#[test]
fn test_path_filters() {
    let engine = sample_engine(Settings::default());

    let notes = ids(&engine, "tomatoes path:notes");
    assert_eq!(notes, vec!["notes/gardening.md"]);

    let without_archive = ids(&engine, "tomatoes -path:archive");
    assert!(!without_archive.is_empty());
    assert!(without_archive.iter().all(|id| !id.starts_with("archive/")));

    assert!(ids(&engine, "tomatoes path:nowhere").is_empty());
}

#[test]
fn test_excluded_text() {
    let engine = sample_engine(Settings::default());
    let with = ids(&engine, "tomato");
    assert!(with.contains(&"notes/cooking.md".to_string()));

    let without = ids(&engine, "tomato -basil");
    assert!(!without.contains(&"notes/cooking.md".to_string()));
    assert_eq!(without.len(), with.len() - 1);
}

#[test]
fn test_exact_phrase_requires_sequence() {
    let (engine, _) = engine_with(
        Settings::default(),
        &[("a.md", "the tomatoes need water"), ("b.md", "remember to water the tomatoes")],
    );
    assert_eq!(ids(&engine, "water tomatoes").len(), 2);
    assert_eq!(ids(&engine, r#""water the tomatoes""#), vec!["b.md"]);
    assert_eq!(ids(&engine, r#""Water The Tomatoes""#), vec!["b.md"]);
}

#[test]
fn test_exact_phrase_matches_title() {
    let (engine, _) = engine_with(
        Settings::default(),
        &[("daily plan.md", "daily agenda and plan"), ("other.md", "plan for the daily standup")],
    );
    assert_eq!(ids(&engine, r#""daily plan""#), vec!["daily plan.md"]);
}

#[test]
fn test_excluded_prefixes_never_indexed() {
    let (engine, _) = engine_with(
        Settings::default(),
        &[("_plug/core.md", "plugin tomatoes"), ("a.md", "garden tomatoes")],
    );
    assert_eq!(ids(&engine, "tomatoes"), vec!["a.md"]);
    assert!(!engine.index_one("_plug/core.md"));
}

#[test]
fn test_single_document_mode() {
    let engine = sample_engine(Settings::default());
    let query = engine.parse_query("tomatoes");

    let results = engine.search(&query, Some("notes/gardening.md"));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].document.id, "notes/gardening.md");

    assert!(engine.search(&query, Some("notes/missing.md")).is_empty());
}

#[test]
fn test_single_document_excerpt_per_group() {
    let content = format!("tomato at the start {} tomato at the end", "filler ".repeat(100));
    let (engine, _) = engine_with(Settings::default(), &[("long.md", content.as_str())]);
    let query = engine.parse_query("tomato");

    let single = engine.search(&query, Some("long.md"));
    assert_eq!(single[0].excerpts.len(), 2);
    assert_eq!(single[0].excerpts[0].offset, Some(0));
    assert!(single[0].excerpts[1].excerpt.starts_with('…'));

    let regular = engine.search(&query, None);
    assert_eq!(regular[0].excerpts.len(), 1);
}

#[test]
fn test_single_document_groups_need_every_exact_term() {
    let content = format!(
        "green tomato soup {} tomato alone {} green tomato again",
        "filler ".repeat(100),
        "filler ".repeat(100)
    );
    let (engine, _) = engine_with(Settings::default(), &[("soup.md", content.as_str())]);
    let query = engine.parse_query(r#""green tomato""#);

    let single = engine.search(&query, Some("soup.md"));
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].excerpts.len(), 2);
    assert!(single[0].excerpts.iter().all(|e| e.excerpt.to_lowercase().contains("green tomato")));
}

#[test]
fn test_single_document_phrases_with_escaped_or_accented_text() {
    let filler = "filler ".repeat(100);
    let cases = [
        ("guide.md", format!("don't panic {filler} don't panic"), r#""don't panic""#),
        ("shows.md", format!("Tom & Jerry episode list {filler} more Tom & Jerry"), r#""tom & jerry""#),
        ("dessert.md", format!("Crème brûlée recipe {filler} burnt crème brûlée"), r#""creme brulee""#),
    ];
    let docs: Vec<(&str, &str)> = cases.iter().map(|(id, content, _)| (*id, content.as_str())).collect();
    let (engine, _) = engine_with(Settings::default(), &docs);

    for (id, _, raw) in &cases {
        let single = engine.search(&engine.parse_query(raw), Some(id));
        assert_eq!(single.len(), 1, "{raw}");
        assert_eq!(single[0].excerpts.len(), 2, "{raw}");
    }
}
