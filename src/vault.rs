// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! A directory of notes as a document provider.
//!
//! Ids are `/`-separated paths relative to the vault root. Hidden files and
//! directories (leading `.`) are not part of the vault. Markdown and plain
//! text are read directly; anything else goes to the extraction hook, if
//! one is installed, and is otherwise not indexed.
//!
//! Markdown metadata comes from a front-matter block:
//!
//! ```text
//! ---
//! tags: [project, idea]
//! aliases: [Plan B]
//! displayName: The Plan
//! status: draft
//! ---
//! Body text with an inline #tag.
//! ```
//!
//! `tags`, `aliases` and `displayName` map to document fields, every other
//! key becomes a custom field, and inline `#tags` in the body join the tags.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::engine::{
    extract_with_hook, ContentProvider, DocumentSource, ExtractionHook, MetadataProvider,
    ProviderError,
};
use crate::types::{extension_of, DocumentMeta, ExtractedContent};

/// Extensions read as text.
pub const TEXT_EXTENSIONS: [&str; 2] = [".md", ".txt"];

const FRONT_MATTER_FENCE: &str = "---";

static INLINE_TAG: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?:^|\s)#([\p{L}\p{N}_/-]+)").ok());

/// A vault rooted at a directory.
#[derive(Clone)]
pub struct Vault {
    root: PathBuf,
    hook: Option<Arc<dyn ExtractionHook>>,
}

impl Vault {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, ProviderError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(ProviderError::Io {
                id: root.display().to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "vault root is not a directory"),
            });
        }
        Ok(Self { root, hook: None })
    }

    /// Route non-text documents through `hook`.
    pub fn with_hook(mut self, hook: Arc<dyn ExtractionHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for `id`. Ids that climb out of the root are not found.
    pub fn path_of(&self, id: &str) -> Result<PathBuf, ProviderError> {
        let relative = Path::new(id);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if id.is_empty() || escapes {
            return Err(ProviderError::NotFound(id.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn read(&self, id: &str) -> Result<String, ProviderError> {
        let path = self.path_of(id)?;
        fs::read_to_string(&path).map_err(|e| io_error(id, e))
    }

    fn walk(&self, dir: &Path, prefix: &str, ids: &mut Vec<String>) -> Result<(), ProviderError> {
        let entries = fs::read_dir(dir).map_err(|e| io_error(prefix, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| io_error(prefix, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let id = if prefix.is_empty() {
                name
            } else {
                format!("{}/{}", prefix, name)
            };
            let file_type = entry.file_type().map_err(|e| io_error(&id, e))?;
            if file_type.is_dir() {
                self.walk(&entry.path(), &id, ids)?;
            } else if file_type.is_file() {
                ids.push(id);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("root", &self.root)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

fn io_error(id: &str, source: io::Error) -> ProviderError {
    if source.kind() == io::ErrorKind::NotFound {
        ProviderError::NotFound(id.to_string())
    } else {
        ProviderError::Io {
            id: id.to_string(),
            source,
        }
    }
}

fn is_text(id: &str) -> bool {
    let ext = extension_of(id).to_lowercase();
    TEXT_EXTENSIONS.contains(&ext.as_str())
}

impl DocumentSource for Vault {
    fn list(&self) -> Result<Vec<String>, ProviderError> {
        let mut ids = Vec::new();
        self.walk(&self.root, "", &mut ids)?;
        ids.sort();
        Ok(ids)
    }
}

impl MetadataProvider for Vault {
    fn metadata(&self, id: &str) -> Result<DocumentMeta, ProviderError> {
        let path = self.path_of(id)?;
        let modified = fs::metadata(&path)
            .and_then(|m| m.modified())
            .map_err(|e| io_error(id, e))?;
        let last_modified = chrono::DateTime::<chrono::Utc>::from(modified).timestamp_millis();

        let mut meta = if is_text(id) {
            parse_metadata(&self.read(id)?)
        } else {
            DocumentMeta::default()
        };
        meta.last_modified = last_modified;
        Ok(meta)
    }
}

impl ContentProvider for Vault {
    fn content(&self, id: &str) -> Result<Option<ExtractedContent>, ProviderError> {
        if is_text(id) {
            return self.read(id).map(|text| Some(ExtractedContent::persistent(text)));
        }
        let Some(hook) = &self.hook else {
            debug!(id, "no extractor for this format");
            return Ok(None);
        };
        let meta = self.metadata(id)?;
        Ok(extract_with_hook(hook.as_ref(), id, &meta))
    }
}

// ============================================================================
// FRONT MATTER
// ============================================================================

/// Split `text` into its front-matter lines and body.
fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    let Some(rest) = text
        .strip_prefix(FRONT_MATTER_FENCE)
        .and_then(|r| r.strip_prefix('\n').or_else(|| r.strip_prefix("\r\n")))
    else {
        return (None, text);
    };
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FRONT_MATTER_FENCE {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, text)
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
        .unwrap_or(value)
}

fn scalar(value: &str) -> Value {
    let value = unquote(value);
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => value
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(value.to_string())),
    }
}

/// Parse `key: value`, `key: [a, b]` and block lists (`key:` then `- a` lines).
fn parse_front_matter(block: &str) -> Vec<(String, Value)> {
    let mut fields: Vec<(String, Value)> = Vec::new();
    for line in block.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if let Some(item) = trimmed.strip_prefix("- ") {
            if let Some((_, Value::Array(items))) = fields.last_mut() {
                items.push(scalar(item));
            }
            continue;
        }
        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let value = value.trim();
        let parsed = if value.is_empty() {
            Value::Array(Vec::new())
        } else if let Some(inner) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
            Value::Array(
                inner
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(scalar)
                    .collect(),
            )
        } else {
            scalar(value)
        };
        fields.push((key.trim().to_string(), parsed));
    }
    fields
}

/// Flatten a front-matter value into strings. Tags given as one string may
/// be separated by commas or spaces; list items are always kept whole.
fn strings(value: &Value, split_words: bool) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().flat_map(|v| strings(v, false)).collect(),
        Value::String(s) if split_words => s
            .split([',', ' '])
            .map(|t| t.trim().trim_start_matches('#'))
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect(),
        Value::String(s) => vec![s.trim().to_string()],
        Value::Number(n) => vec![n.to_string()],
        _ => Vec::new(),
    }
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Document metadata from markdown text: front matter plus inline tags.
pub fn parse_metadata(text: &str) -> DocumentMeta {
    let (front, body) = split_front_matter(text);
    let mut meta = DocumentMeta::default();

    for (key, value) in front.map(parse_front_matter).unwrap_or_default() {
        match key.as_str() {
            "tags" | "tag" => {
                for tag in strings(&value, true) {
                    let tag = tag.trim_start_matches('#').to_string();
                    push_unique(&mut meta.tags, tag);
                }
            }
            "aliases" | "alias" => meta.aliases = strings(&value, false),
            "displayName" => {
                meta.display_name = match &value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                }
            }
            _ => {
                meta.custom_fields.insert(key, value);
            }
        }
    }

    if let Some(re) = INLINE_TAG.as_ref() {
        for caps in re.captures_iter(body) {
            push_unique(&mut meta.tags, caps[1].to_string());
        }
    }
    meta
}
