// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Engine settings.
//!
//! Settings arrive from the host as loosely typed JSON. [`Settings::validate`]
//! turns that into a typed value or a list of field-level errors;
//! [`Settings::load_or_default`] is the forgiving entry point used by the
//! engine: it reports a bad configuration once per process and carries on
//! with defaults.
//!
//! ```json
//! {
//!   "weights": { "basename": 10, "directory": 7 },
//!   "recencyBoost": "week",
//!   "downrankedFoldersFilters": ["archive"],
//!   "fuzziness": "2"
//! }
//! ```

mod validate;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::query::ParseOptions;
use crate::tokenize::TokenizeOptions;
use crate::types::IndexedField;

pub use validate::{ConfigError, FieldError};

static ERROR_REPORTED: AtomicBool = AtomicBool::new(false);

/// Per-field score multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct FieldWeights {
    pub content: f64,
    pub basename: f64,
    pub display_name: f64,
    pub directory: f64,
    pub aliases: f64,
    /// Tags are stored, not indexed; kept so host configurations validate.
    pub tags: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            content: 1.0,
            basename: 10.0,
            display_name: 10.0,
            directory: 7.0,
            aliases: 1.0,
            tags: 1.0,
        }
    }
}

impl FieldWeights {
    /// Boost for an indexed field.
    pub fn for_field(&self, field: IndexedField) -> f64 {
        match field {
            IndexedField::Content => self.content,
            IndexedField::Basename => self.basename,
            IndexedField::Directory => self.directory,
            IndexedField::Aliases => self.aliases,
            IndexedField::DisplayName => self.display_name,
        }
    }

    /// Boosts in [`IndexedField::ALL`] order.
    pub fn boosts(&self) -> [f64; 5] {
        IndexedField::ALL.map(|f| self.for_field(f))
    }
}

/// How strongly recently modified documents are favoured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecencyCutoff {
    #[default]
    Disabled,
    Day,
    Week,
    Month,
}

impl RecencyCutoff {
    /// Exponential decay rate per elapsed day, `None` when disabled.
    pub fn decay_per_day(self) -> Option<f64> {
        match self {
            RecencyCutoff::Disabled => None,
            RecencyCutoff::Day => Some(-0.003),
            RecencyCutoff::Week => Some(-0.0003),
            RecencyCutoff::Month => Some(-0.0001),
        }
    }
}

/// Typo tolerance level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fuzziness {
    #[serde(rename = "0")]
    Off,
    #[default]
    #[serde(rename = "1")]
    Low,
    #[serde(rename = "2")]
    High,
}

impl Fuzziness {
    /// Allowed edit distance as a fraction of term length.
    pub fn ratio(self) -> f64 {
        match self {
            Fuzziness::Off => 0.0,
            Fuzziness::Low => 0.1,
            Fuzziness::High => 0.2,
        }
    }
}

/// All engine settings. Keys are camelCase in JSON; unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct Settings {
    pub weights: FieldWeights,
    /// Front-matter property name → multiplier when a matched term equals its value.
    pub weight_custom_properties: BTreeMap<String, f64>,
    pub recency_boost: RecencyCutoff,
    /// Folder names whose documents are ranked lower.
    pub downranked_folders_filters: Vec<String>,
    pub ignore_diacritics: bool,
    pub ignore_arabic_diacritics: bool,
    pub tokenize_urls: bool,
    pub split_camel_case: bool,
    pub fuzziness: Fuzziness,
    pub render_line_return_in_excerpts: bool,
    /// Capacity of the per-document entry cache.
    pub entry_cache_capacity: usize,
    /// Worker threads for bulk reindexing.
    pub indexing_concurrency: usize,
    /// Id prefixes that are never indexed.
    pub excluded_prefixes: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            weights: FieldWeights::default(),
            weight_custom_properties: BTreeMap::new(),
            recency_boost: RecencyCutoff::Disabled,
            downranked_folders_filters: Vec::new(),
            ignore_diacritics: true,
            ignore_arabic_diacritics: false,
            tokenize_urls: true,
            split_camel_case: true,
            fuzziness: Fuzziness::Low,
            render_line_return_in_excerpts: true,
            entry_cache_capacity: 2048,
            indexing_concurrency: 8,
            excluded_prefixes: vec!["_plug/".to_string()],
        }
    }
}

impl Settings {
    /// Validate a JSON settings object, collecting every field-level error.
    pub fn validate(value: &serde_json::Value) -> Result<Settings, ConfigError> {
        validate::validate(value)
    }

    /// Validated settings, or defaults when `value` is invalid.
    ///
    /// The first invalid configuration seen by the process is logged; later
    /// ones fall back silently.
    pub fn load_or_default(value: &serde_json::Value) -> Settings {
        match Settings::validate(value) {
            Ok(settings) => settings,
            Err(e) => {
                if !ERROR_REPORTED.swap(true, Ordering::Relaxed) {
                    warn!(error = %e, "invalid settings, using defaults");
                }
                Settings::default()
            }
        }
    }

    pub fn tokenize_options(&self) -> TokenizeOptions {
        TokenizeOptions {
            tokenize_urls: self.tokenize_urls,
            split_camel_case: self.split_camel_case,
        }
    }

    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            ignore_diacritics: self.ignore_diacritics,
            ignore_arabic_diacritics: self.ignore_arabic_diacritics,
        }
    }

    /// Is this id outside the indexed set?
    pub fn is_excluded(&self, id: &str) -> bool {
        self.excluded_prefixes.iter().any(|p| id.starts_with(p.as_str()))
    }
}
