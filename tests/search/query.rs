//! Query parsing through the public API.

use sift::{tokenize_for_search, ParseOptions, Query, Settings, TokenizeOptions};

use crate::common::{engine_with, ids};

fn parse(raw: &str) -> Query {
    Query::parse(
        raw,
        ParseOptions {
            ignore_diacritics: true,
            ignore_arabic_diacritics: false,
        },
    )
}

#[test]
fn test_best_string_for_excerpt() {
    assert_eq!(parse(r#""hello world" foo"#).best_string_for_excerpt(), "hello world");
    assert_eq!(parse("plain words").best_string_for_excerpt(), "plain words");
}

#[test]
fn test_empty_and_filter_only() {
    assert!(parse("").is_empty());
    assert!(parse("ext:md").is_empty());
    assert!(parse("path:notes -ext:pdf").is_empty());
    assert!(!parse("ext:md todo").is_empty());
}

#[test]
fn test_filters_split_from_text() {
    let q = parse("Todo -done path:Work ext:md,txt -path:archive");
    assert_eq!(q.text_terms, vec!["todo"]);
    assert_eq!(q.exclude.text, vec!["done"]);
    assert_eq!(q.include.path, vec!["work"]);
    assert_eq!(q.include.ext, vec!["md", "txt"]);
    assert_eq!(q.exclude.path, vec!["archive"]);
}

#[test]
fn test_search_tokens_form_groups() {
    let query = tokenize_for_search("fooBar-baz", &TokenizeOptions::default());
    assert!(!query.is_empty());
    // one group per enabled strategy
    assert_eq!(query.groups.len(), 4);

    let no_camel = TokenizeOptions {
        split_camel_case: false,
        ..TokenizeOptions::default()
    };
    assert_eq!(tokenize_for_search("fooBar-baz", &no_camel).groups.len(), 3);
}

#[test]
fn test_hyphenated_query_finds_separate_words() {
    let (engine, _) = engine_with(Settings::default(), &[("a.md", "well known and documented")]);
    assert_eq!(ids(&engine, "well-known"), vec!["a.md"]);
}

#[test]
fn test_camel_case_query_finds_parts() {
    let (engine, _) = engine_with(Settings::default(), &[("a.md", "the search engine")]);
    assert_eq!(ids(&engine, "searchEngine"), vec!["a.md"]);
}

#[test]
fn test_urls_are_searchable_whole() {
    let (engine, _) = engine_with(
        Settings::default(),
        &[("a.md", "see https://example.com/docs for more"), ("b.md", "example docs")],
    );
    assert_eq!(ids(&engine, "https://example.com/docs"), vec!["a.md"]);
}
