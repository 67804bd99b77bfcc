// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! The values that flow through the search pipeline.
//!
//! ```text
//! DocumentMeta + content ──▶ Document ──▶ InvertedIndex ──▶ RankedHit
//!                                                              │
//!                      CompleteEntry (cached, cleaned) ◀───────┤
//!                                                              ▼
//!                                   ResultPage { matches, excerpts, .. }
//! ```
//!
//! Ids are `/`-separated paths. Markdown documents keep their `.md` suffix in
//! the id and drop it from the display name; every other document is named
//! by its full path.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::util::remove_stray_diacritics;

/// Suffix that marks a document as a markdown page.
pub const MARKDOWN_EXTENSION: &str = ".md";

/// Is this id a markdown page?
pub fn is_markdown_path(id: &str) -> bool {
    id.ends_with(MARKDOWN_EXTENSION)
}

/// Display name for an id: the path without the markdown suffix.
pub fn name_from_path(id: &str) -> &str {
    id.strip_suffix(MARKDOWN_EXTENSION).unwrap_or(id)
}

/// The extension of an id including its leading dot. Ids without a dot are
/// pages and report `.md`.
pub fn extension_of(id: &str) -> String {
    match id.rsplit_once('.') {
        Some((_, ext)) => format!(".{}", ext),
        None => MARKDOWN_EXTENSION.to_string(),
    }
}

// =============================================================================
// DOCUMENTS
// =============================================================================

/// Metadata a host knows about a document, independent of its content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentMeta {
    /// Milliseconds since the Unix epoch; 0 when unknown.
    pub last_modified: i64,
    pub aliases: Vec<String>,
    pub display_name: String,
    /// Tags without the leading `#`.
    pub tags: Vec<String>,
    /// Any other front-matter property, used by custom-property boosts.
    pub custom_fields: BTreeMap<String, serde_json::Value>,
}

/// A document as the index sees it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    pub content: String,
    pub basename: String,
    pub directory: String,
    pub aliases: Vec<String>,
    pub display_name: String,
    /// Tags with the leading `#`.
    pub tags: Vec<String>,
    pub unmarked_tags: Vec<String>,
    pub last_modified: i64,
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Document {
    /// Assemble a document from its id, raw content and host metadata.
    ///
    /// Content is cleaned of stray combining marks so that per-character
    /// folding later lines up with the stored text.
    pub fn from_parts(id: &str, content: &str, meta: &DocumentMeta) -> Self {
        let name = name_from_path(id);
        let (directory, basename) = match name.rsplit_once('/') {
            Some((dir, base)) => (dir, base),
            None => ("", name),
        };

        Self {
            id: id.to_string(),
            name: name.to_string(),
            content: remove_stray_diacritics(content),
            basename: basename.to_string(),
            directory: directory.to_string(),
            aliases: meta.aliases.clone(),
            display_name: meta.display_name.clone(),
            tags: meta.tags.iter().map(|t| format!("#{}", t)).collect(),
            unmarked_tags: meta.tags.clone(),
            last_modified: meta.last_modified,
            metadata: meta.custom_fields.clone(),
        }
    }

    /// Text of one indexed field.
    pub fn field_text(&self, field: IndexedField) -> String {
        match field {
            IndexedField::Content => self.content.clone(),
            IndexedField::Basename => self.basename.clone(),
            IndexedField::Directory => self.directory.clone(),
            IndexedField::Aliases => self.aliases.join(" "),
            IndexedField::DisplayName => self.display_name.clone(),
        }
    }

    /// Fields kept alongside the postings for the boost functions.
    pub fn stored_fields(&self) -> StoredFields {
        StoredFields {
            last_modified: self.last_modified,
            tags: self.tags.clone(),
        }
    }
}

/// Fields that are tokenized and weighted. Order is the on-disk field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndexedField {
    Content,
    Basename,
    Directory,
    Aliases,
    DisplayName,
}

impl IndexedField {
    pub const ALL: [IndexedField; 5] = [
        IndexedField::Content,
        IndexedField::Basename,
        IndexedField::Directory,
        IndexedField::Aliases,
        IndexedField::DisplayName,
    ];

    /// Position in [`IndexedField::ALL`].
    pub fn slot(self) -> usize {
        self as usize
    }
}

/// Stored but not tokenized: read only by the boost functions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFields {
    pub last_modified: i64,
    pub tags: Vec<String>,
}

// =============================================================================
// SEARCH OUTPUT
// =============================================================================

/// A located match: the matched text and its char offset in the source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchMatch {
    #[serde(rename = "match")]
    pub text: String,
    pub offset: usize,
}

impl SearchMatch {
    pub fn new(text: impl Into<String>, offset: usize) -> Self {
        Self {
            text: text.into(),
            offset,
        }
    }
}

/// A raw index hit. The ranking pipeline rescales `score` in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedHit {
    pub id: String,
    pub score: f64,
    /// Index terms that matched (after prefix/fuzzy expansion).
    pub terms: Vec<String>,
    /// Query terms that produced at least one match.
    pub query_terms: Vec<String>,
    pub stored: StoredFields,
}

/// One rendered excerpt window. `offset` is `None` for the no-match prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultExcerpt {
    pub offset: Option<usize>,
    pub excerpt: String,
}

/// Final output unit handed to the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultPage {
    pub score: f64,
    #[serde(flatten)]
    pub document: Document,
    pub found_words: Vec<String>,
    pub matches: Vec<SearchMatch>,
    pub matches_name: Vec<SearchMatch>,
    pub excerpts: Vec<ResultExcerpt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub navigation_map: Option<NavigationMap>,
}

// =============================================================================
// EXTRACTED CONTENT
// =============================================================================

/// Whether extracted content may be kept in the per-document entry cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheMode {
    #[default]
    Persistent,
    Session,
}

/// A range of content offsets and the navigation target it resolves to
/// (a page number, a heading anchor, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRoute {
    pub from: usize,
    pub to: usize,
    pub tail: String,
}

/// Navigation hints produced by an extractor alongside its content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NavigationMap(pub Vec<NavigationRoute>);

/// Tail of the first route whose inclusive range contains `offset`.
pub fn solve_navigation_map(map: &NavigationMap, offset: usize) -> Option<&str> {
    map.0
        .iter()
        .find(|route| route.from <= offset && offset <= route.to)
        .map(|route| route.tail.as_str())
}

/// Content returned by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractedContent {
    pub content: String,
    pub cache_mode: CacheMode,
    pub navigation_map: Option<NavigationMap>,
}

impl ExtractedContent {
    pub fn persistent(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

/// A document plus everything result assembly needs, as kept in the entry cache.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteEntry {
    pub document: Document,
    /// Diacritic-free, emphasis-free content for exact-phrase checks.
    pub cleaned_content: String,
    pub navigation_map: Option<NavigationMap>,
    pub cache_mode: CacheMode,
}
