//! Index and engine invariants under random corpora.

use proptest::prelude::*;
use sift::{
    tokenize_for_search, Document, DocumentMeta, IndexOptions, InvertedIndex, SearchOptions,
    Settings, TokenizeOptions,
};

use super::{corpus_strategy, document_strategy};
use crate::common::engine_with;

/// Never produced by the word strategy, which has no digits.
const MARKER: &str = "marker0unique";

fn doc(id: &str, content: &str) -> Document {
    Document::from_parts(id, content, &DocumentMeta::default())
}

fn build(corpus: &[String]) -> InvertedIndex {
    let mut index = InvertedIndex::new(IndexOptions::default());
    for (i, content) in corpus.iter().enumerate() {
        index.add(&doc(&format!("d{i}.md"), content)).unwrap();
    }
    index
}

fn hit_ids(index: &InvertedIndex, text: &str) -> Vec<String> {
    let query = tokenize_for_search(text, &TokenizeOptions::default());
    index
        .search(&query, &SearchOptions::default())
        .into_iter()
        .map(|h| h.id)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// After removal, a term only the removed document had finds nothing.
    #[test]
    fn prop_removed_document_not_found(corpus in corpus_strategy(), pick in any::<prop::sample::Index>()) {
        let mut corpus = corpus;
        let k = pick.index(corpus.len());
        corpus[k] = format!("{} {}", corpus[k], MARKER);

        let mut index = build(&corpus);
        let id = format!("d{k}.md");
        prop_assert_eq!(hit_ids(&index, MARKER), vec![id.clone()]);

        prop_assert!(index.remove(&id));
        prop_assert!(hit_ids(&index, MARKER).is_empty());
        prop_assert_eq!(index.len(), corpus.len() - 1);
    }

    /// Replacing a document never leaves two entries behind.
    #[test]
    fn prop_replace_keeps_one_entry(first in document_strategy(), second in document_strategy()) {
        let mut index = InvertedIndex::new(IndexOptions::default());
        index.add(&doc("a.md", &format!("{first} {MARKER}"))).unwrap();
        index.replace(&doc("a.md", &second));

        prop_assert_eq!(index.len(), 1);
        prop_assert!(hit_ids(&index, MARKER).is_empty());
        let words: Vec<&str> = second.split(' ').collect();
        prop_assert_eq!(hit_ids(&index, words[0]), vec!["a.md".to_string()]);
    }

    /// Hits are unique and sorted by descending score.
    #[test]
    fn prop_hits_sorted_and_unique(corpus in corpus_strategy(), query in document_strategy()) {
        let index = build(&corpus);
        let query = tokenize_for_search(&query, &TokenizeOptions::default());
        let hits = index.search(&query, &SearchOptions::default());

        for pair in hits.windows(2) {
            prop_assert!(pair[0].score >= pair[1].score);
            prop_assert_ne!(&pair[0].id, &pair[1].id);
        }
        prop_assert!(hits.iter().all(|h| h.score > 0.0));
    }

    /// Every word of a document finds that document.
    #[test]
    fn prop_every_word_is_searchable(corpus in corpus_strategy()) {
        let index = build(&corpus);
        for (i, content) in corpus.iter().enumerate() {
            let id = format!("d{i}.md");
            for word in content.split(' ') {
                prop_assert!(hit_ids(&index, word).contains(&id), "{} not found by {}", id, word);
            }
        }
    }

    /// Serialization preserves search results.
    #[test]
    fn prop_restore_preserves_results(corpus in corpus_strategy(), query in document_strategy()) {
        let index = build(&corpus);
        let restored = InvertedIndex::restore(&index.serialize().unwrap(), IndexOptions::default()).unwrap();
        prop_assert_eq!(hit_ids(&restored, &query), hit_ids(&index, &query));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Re-indexing the same id through the engine never adds a document.
    #[test]
    fn prop_engine_reindex_is_idempotent(corpus in corpus_strategy()) {
        let docs: Vec<(String, String)> = corpus
            .iter()
            .enumerate()
            .map(|(i, c)| (format!("d{i}.md"), c.clone()))
            .collect();
        let refs: Vec<(&str, &str)> = docs.iter().map(|(a, b)| (a.as_str(), b.as_str())).collect();
        let (engine, _) = engine_with(Settings::default(), &refs);

        prop_assert_eq!(engine.document_count(), docs.len());
        prop_assert!(engine.index_one("d0.md"));
        prop_assert!(engine.index_one("d0.md"));
        prop_assert_eq!(engine.document_count(), docs.len());
        prop_assert!(!engine.delete_one("missing.md"));
        prop_assert_eq!(engine.document_count(), docs.len());
    }
}
