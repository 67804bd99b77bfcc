//! Matches, excerpts and highlighting on assembled result pages.

use std::sync::Arc;

use sift::testing::{indexed_engine, MemorySpace};
use sift::{
    get_matches, highlight_text, make_excerpt, solve_navigation_map, CacheMode, DocumentMeta,
    ExcerptOptions, ExtractedContent, MatchOptions, NavigationMap, NavigationRoute, SearchMatch,
    Settings,
};

use crate::common::{engine_with, page};

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_match_keeps_source_casing_and_offset() {
    let matches = get_matches("The quick Fox", &words(&["fox"]), None, &MatchOptions::default());
    assert_eq!(matches, vec![SearchMatch::new("Fox", 10)]);
}

#[test]
fn test_excerpt_without_offset() {
    let content = "word ".repeat(200);
    let excerpt = make_excerpt(&content, None, &ExcerptOptions::default());
    assert!(excerpt.chars().count() <= 300);
    assert!(!excerpt.starts_with('…'));
    assert!(make_excerpt("", None, &ExcerptOptions::default()).is_empty());
}

#[test]
fn test_excerpt_is_escaped_and_highlightable() {
    let (engine, _) = engine_with(Settings::default(), &[("tj.md", "Tom & Jerry love <cheese>")]);
    let results = engine.search(&engine.parse_query("cheese"), None);
    let result = page(&results, "tj.md");

    assert_eq!(result.matches, vec![SearchMatch::new("cheese", 18)]);
    let excerpt = &result.excerpts[0].excerpt;
    assert_eq!(excerpt, "Tom &amp; Jerry love &lt;cheese&gt;");

    let highlighted = highlight_text(excerpt, &result.matches);
    assert!(highlighted.contains(r#"&lt;<span class="sift-highlight">cheese</span>&gt;"#));
    assert!(highlighted.contains("Tom &amp; Jerry"));
}

#[test]
fn test_long_document_excerpt_window() {
    let content = format!("{}needle{}", "a ".repeat(200), " b".repeat(400));
    let (engine, _) = engine_with(Settings::default(), &[("long.md", content.as_str())]);
    let results = engine.search(&engine.parse_query("needle"), None);
    let excerpt = &results[0].excerpts[0];

    assert_eq!(excerpt.offset, Some(400));
    assert!(excerpt.excerpt.starts_with('…'));
    assert!(excerpt.excerpt.ends_with('…'));
    assert!(excerpt.excerpt.contains("needle"));
}

#[test]
fn test_line_returns() {
    let content = "first line\n\n\nsecond tomato line";
    let offset = Some(20);

    let rendered = make_excerpt(content, offset, &ExcerptOptions::default());
    assert_eq!(rendered, "second tomato line");

    let plain = make_excerpt(content, offset, &ExcerptOptions { render_line_returns: false });
    assert_eq!(plain, content);

    let breaks = make_excerpt("one\ntwo tomato\nthree", Some(8), &ExcerptOptions::default());
    assert_eq!(breaks, "two tomato<br>three");
}

#[test]
fn test_line_returns_setting_reaches_results() {
    let settings = Settings {
        render_line_return_in_excerpts: false,
        ..Settings::default()
    };
    let (engine, _) = engine_with(settings, &[("a.md", "intro\nthe tomato\nend")]);
    let results = engine.search(&engine.parse_query("tomato"), None);
    assert_eq!(results[0].excerpts[0].excerpt, "intro\nthe tomato\nend");
}

#[test]
fn test_name_matches() {
    let (engine, _) = engine_with(Settings::default(), &[("notes/tomato-plan.md", "a plan")]);
    let results = engine.search(&engine.parse_query("tomato"), None);
    let result = page(&results, "notes/tomato-plan.md");

    // the prefix expansion `tomato-plan` is the longer found word
    assert_eq!(result.matches_name, vec![SearchMatch::new("tomato-plan", 6)]);
    assert!(result.matches.is_empty());
    assert_eq!(result.excerpts[0].offset, None);
    assert_eq!(result.excerpts[0].excerpt, "a plan");
}

#[test]
fn test_diacritic_insensitive_matches() {
    let (engine, _) = engine_with(Settings::default(), &[("a.md", "Déjà vu at the café")]);
    let results = engine.search(&engine.parse_query("cafe"), None);
    assert_eq!(results[0].matches, vec![SearchMatch::new("café", 15)]);
}

#[test]
fn test_best_string_match_comes_first() {
    let (engine, _) = engine_with(Settings::default(), &[("a.md", "later on, hello world")]);
    let results = engine.search(&engine.parse_query(r#"later "hello world""#), None);
    assert_eq!(results[0].matches[0], SearchMatch::new("hello world", 10));
    assert_eq!(results[0].excerpts[0].offset, Some(10));
}

#[test]
fn test_navigation_map_travels_with_result() {
    let space = Arc::new(MemorySpace::new());
    let map = NavigationMap(vec![
        NavigationRoute { from: 0, to: 9, tail: "#page=1".into() },
        NavigationRoute { from: 10, to: 100, tail: "#page=2".into() },
    ]);
    space.put_extracted(
        "scan.pdf",
        ExtractedContent {
            content: "page one. page two has the keyword".into(),
            cache_mode: CacheMode::Persistent,
            navigation_map: Some(map),
        },
        DocumentMeta::default(),
    );
    let engine = indexed_engine(Settings::default(), &space);

    let results = engine.search(&engine.parse_query("keyword"), None);
    let result = page(&results, "scan.pdf");
    let map = result.navigation_map.as_ref().expect("navigation map");
    assert_eq!(solve_navigation_map(map, result.matches[0].offset), Some("#page=2"));
}
