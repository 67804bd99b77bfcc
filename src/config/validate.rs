// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Key-by-key settings validation.
//!
//! Each key is deserialized on its own so that one bad value does not hide
//! the others. Semantic checks run after the shape checks pass.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::{FieldWeights, Settings};

/// One invalid setting: a dotted path and what is wrong with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub message: String,
}

impl FieldError {
    fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{} in \"{}\"", self.message, self.path)
        }
    }
}

fn join(errors: &[FieldError]) -> String {
    let parts: Vec<String> = errors.iter().map(ToString::to_string).collect();
    parts.join("; ")
}

/// Settings that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid settings: {}", join(.errors))]
pub struct ConfigError {
    pub errors: Vec<FieldError>,
}

fn field<T: DeserializeOwned>(
    object: &Map<String, Value>,
    key: &str,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<T> {
    let value = object.get(key)?;
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            errors.push(FieldError::new(path, e.to_string()));
            None
        }
    }
}

fn check_weight(value: f64, path: &str, errors: &mut Vec<FieldError>) {
    if !value.is_finite() || value < 0.0 {
        errors.push(FieldError::new(path, "must be a finite number >= 0"));
    }
}

fn validate_weights(value: &Value, errors: &mut Vec<FieldError>) -> FieldWeights {
    let mut weights = FieldWeights::default();
    let Some(object) = value.as_object() else {
        errors.push(FieldError::new("weights", "expected an object"));
        return weights;
    };

    for key in object.keys() {
        let path = format!("weights.{}", key);
        let slot = match key.as_str() {
            "content" => &mut weights.content,
            "basename" => &mut weights.basename,
            "displayName" => &mut weights.display_name,
            "directory" => &mut weights.directory,
            "aliases" => &mut weights.aliases,
            "tags" => &mut weights.tags,
            _ => {
                errors.push(FieldError::new(path, "unknown key"));
                continue;
            }
        };
        if let Some(v) = field::<f64>(object, key, &path, errors) {
            check_weight(v, &path, errors);
            *slot = v;
        }
    }
    weights
}

pub(super) fn validate(value: &Value) -> Result<Settings, ConfigError> {
    let mut errors = Vec::new();
    let mut settings = Settings::default();

    let Some(object) = value.as_object() else {
        return Err(ConfigError {
            errors: vec![FieldError::new("", "expected an object")],
        });
    };

    macro_rules! take {
        ($key:literal => $slot:expr) => {
            if let Some(v) = field(object, $key, $key, &mut errors) {
                $slot = v;
            }
        };
    }

    for key in object.keys() {
        match key.as_str() {
            "weights" => settings.weights = validate_weights(&object[key], &mut errors),
            "weightCustomProperties" => take!("weightCustomProperties" => settings.weight_custom_properties),
            "recencyBoost" => take!("recencyBoost" => settings.recency_boost),
            "downrankedFoldersFilters" => take!("downrankedFoldersFilters" => settings.downranked_folders_filters),
            "ignoreDiacritics" => take!("ignoreDiacritics" => settings.ignore_diacritics),
            "ignoreArabicDiacritics" => take!("ignoreArabicDiacritics" => settings.ignore_arabic_diacritics),
            "tokenizeUrls" => take!("tokenizeUrls" => settings.tokenize_urls),
            "splitCamelCase" => take!("splitCamelCase" => settings.split_camel_case),
            "fuzziness" => take!("fuzziness" => settings.fuzziness),
            "renderLineReturnInExcerpts" => take!("renderLineReturnInExcerpts" => settings.render_line_return_in_excerpts),
            "entryCacheCapacity" => take!("entryCacheCapacity" => settings.entry_cache_capacity),
            "indexingConcurrency" => take!("indexingConcurrency" => settings.indexing_concurrency),
            "excludedPrefixes" => take!("excludedPrefixes" => settings.excluded_prefixes),
            _ => errors.push(FieldError::new(key.as_str(), "unknown key")),
        }
    }

    for (name, weight) in &settings.weight_custom_properties {
        check_weight(*weight, &format!("weightCustomProperties.{}", name), &mut errors);
    }
    if settings.entry_cache_capacity == 0 {
        errors.push(FieldError::new("entryCacheCapacity", "must be greater than 0"));
    }
    if settings.indexing_concurrency == 0 {
        errors.push(FieldError::new("indexingConcurrency", "must be greater than 0"));
    }

    if errors.is_empty() {
        Ok(settings)
    } else {
        Err(ConfigError { errors })
    }
}
