//! Tokenizer, matcher, excerpt and highlighter invariants.

use std::collections::HashSet;

use proptest::prelude::*;
use sift::excerpt::MAX_MATCHES;
use sift::fuzzy::bounded_edit_distance;
use sift::util::escape_html;
use sift::{
    get_groups, get_matches, highlight_text, make_excerpt, tokenize_for_indexing,
    tokenize_for_search, ExcerptOptions, MatchOptions, ParseOptions, Query, TokenizeOptions,
};

use super::{document_strategy, messy_text_strategy, word_strategy};

fn folding() -> MatchOptions {
    MatchOptions {
        ignore_diacritics: true,
        ignore_arabic_diacritics: false,
    }
}

fn strip_spans(text: &str) -> String {
    text.replace(r#"<span class="sift-highlight">"#, "").replace("</span>", "")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_index_tokens_unique_and_non_empty(text in messy_text_strategy()) {
        let tokens = tokenize_for_indexing(&text, &TokenizeOptions::default());
        let unique: HashSet<&String> = tokens.iter().collect();
        prop_assert_eq!(unique.len(), tokens.len());
        prop_assert!(tokens.iter().all(|t| !t.is_empty()));
    }

    #[test]
    fn prop_search_groups_have_no_empty_terms(text in messy_text_strategy()) {
        let query = tokenize_for_search(&text, &TokenizeOptions::default());
        for group in &query.groups {
            prop_assert!(group.terms.iter().all(|t| !t.is_empty()));
        }
    }

    /// A match points at source text that escapes to the match string.
    #[test]
    fn prop_match_offsets_point_at_source(text in messy_text_strategy(), words in prop::collection::vec(word_strategy(), 1..4)) {
        let mut words = words;
        words.push("cafe".to_string());
        let chars: Vec<char> = text.chars().collect();
        let matches = get_matches(&text, &words, None, &folding());

        prop_assert!(matches.len() <= MAX_MATCHES);
        for m in &matches {
            prop_assert!(m.offset < chars.len());
            let rest: String = chars[m.offset..].iter().collect();
            prop_assert!(escape_html(&rest).starts_with(&m.text), "{:?} at {}", m.text, m.offset);
        }
        for pair in matches.windows(2) {
            prop_assert!(pair[0].offset < pair[1].offset);
        }
    }

    #[test]
    fn prop_excerpt_without_offset_is_bounded(content in document_strategy()) {
        let excerpt = make_excerpt(&content, None, &ExcerptOptions::default());
        prop_assert!(excerpt.chars().count() <= 300);
        prop_assert!(!excerpt.starts_with('…'));
    }

    /// Excerpts never fail on any in-range offset, and are empty past the end.
    #[test]
    fn prop_excerpt_any_offset(content in messy_text_strategy(), pick in any::<prop::sample::Index>(), render in any::<bool>()) {
        let options = ExcerptOptions { render_line_returns: render };
        let len = content.chars().count();
        let offset = pick.index(len + 1);
        let excerpt = make_excerpt(&content, Some(offset), &options);
        // 100 before, 300 after, two ellipses, entities at most six chars each
        prop_assert!(excerpt.chars().count() <= 6 * 400 + 2);
        prop_assert_eq!(make_excerpt(&content, Some(len + 1), &options), "");
    }

    /// Groups cover every match once, in order, each within one window.
    #[test]
    fn prop_groups_partition_matches(text in document_strategy(), word in word_strategy()) {
        let content = format!("{text} {word} {text} {word}");
        let matches = get_matches(&content, &[word], None, &folding());
        let groups = get_groups(&matches);

        let flattened: Vec<usize> = groups.iter().flatten().map(|m| m.offset).collect();
        let offsets: Vec<usize> = matches.iter().map(|m| m.offset).collect();
        prop_assert_eq!(flattened, offsets);
        for group in &groups {
            prop_assert!(!group.is_empty());
            prop_assert!(group[group.len() - 1].offset - group[0].offset <= 300);
        }
    }

    /// Highlighting only adds markup.
    #[test]
    fn prop_highlight_preserves_text(text in messy_text_strategy(), words in prop::collection::vec(word_strategy(), 1..4)) {
        let escaped = escape_html(&text);
        let matches = get_matches(&text, &words, None, &folding());
        let highlighted = highlight_text(&escaped, &matches);
        prop_assert_eq!(strip_spans(&highlighted), escaped);
    }

    #[test]
    fn prop_keyword_only_queries_are_empty(word in word_strategy(), negated in any::<bool>()) {
        let raw = if negated { format!("-ext:{word}") } else { format!("ext:{word} path:{word}") };
        let query = Query::parse(&raw, ParseOptions::default());
        prop_assert!(query.is_empty());
    }

    #[test]
    fn prop_query_parsing_never_panics(raw in ".{0,80}") {
        let query = Query::parse(&raw, ParseOptions::default());
        let _ = query.best_string_for_excerpt();
        let _ = query.exact_terms();
        prop_assert_eq!(query.is_empty(), query.text_terms.is_empty());
    }

    #[test]
    fn prop_edit_distance_symmetric_and_bounded(a in word_strategy(), b in word_strategy(), max in 0usize..4) {
        let forward = bounded_edit_distance(&a, &b, max);
        prop_assert_eq!(forward, bounded_edit_distance(&b, &a, max));
        if let Some(d) = forward {
            prop_assert!(d <= max);
        }
        prop_assert_eq!(bounded_edit_distance(&a, &a, max), Some(0));
    }
}
