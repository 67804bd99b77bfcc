// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Excerpt windows around a match offset.

use tracing::error;

use crate::util::escape_html;

use super::{EXCERPT_AFTER, EXCERPT_BEFORE};

const ELLIPSIS: char = '…';

/// Rendering knobs for excerpts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExcerptOptions {
    /// Keep line structure: collapse blank lines, start at the match's line,
    /// render line breaks as `<br>`.
    pub render_line_returns: bool,
}

impl Default for ExcerptOptions {
    fn default() -> Self {
        Self {
            render_line_returns: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
enum ExcerptError {
    #[error("offset {offset} is past the end of {len} chars")]
    OffsetOutOfRange { offset: usize, len: usize },
}

/// HTML-safe excerpt of `content` around the char `offset`.
///
/// Without an offset the excerpt is the first [`EXCERPT_AFTER`] chars. With
/// one, the window spans [`EXCERPT_BEFORE`] chars before to [`EXCERPT_AFTER`]
/// after, with `…` marking a cut at either end. Never fails: a bad offset
/// yields an empty string.
pub fn make_excerpt(content: &str, offset: Option<usize>, options: &ExcerptOptions) -> String {
    match try_make_excerpt(content, offset, options) {
        Ok(excerpt) => excerpt,
        Err(e) => {
            error!(error = %e, "failed to build excerpt");
            String::new()
        }
    }
}

fn try_make_excerpt(
    content: &str,
    offset: Option<usize>,
    options: &ExcerptOptions,
) -> Result<String, ExcerptError> {
    let chars: Vec<char> = content.chars().collect();
    let len = chars.len();

    let (mut text, match_at) = match offset {
        None => (chars[..len.min(EXCERPT_AFTER)].iter().collect::<String>(), None),
        Some(pos) => {
            if pos > len {
                return Err(ExcerptError::OffsetOutOfRange { offset: pos, len });
            }
            let from = pos.saturating_sub(EXCERPT_BEFORE);
            let to = (pos + EXCERPT_AFTER).min(len);

            // head: everything before the match, tail: the match onwards
            let head: String = chars[from..pos].iter().collect();
            let tail: String = chars[pos..to].iter().collect();
            let head = head.trim_start();
            let tail = tail.trim_end();

            let mut text = String::with_capacity(head.len() + tail.len() + 6);
            if from > 0 {
                text.push(ELLIPSIS);
            }
            text.push_str(head);
            let match_at = text.len();
            text.push_str(tail);
            if to < len {
                text.push(ELLIPSIS);
            }
            (text, Some(match_at))
        }
    };

    if options.render_line_returns {
        if let Some(at) = match_at {
            if let Some(newline) = text[..at].rfind('\n').filter(|&i| i > 0) {
                text = text[newline..].to_string();
            }
        }
        text = text
            .split(['\r', '\n'])
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n");
    }

    let mut excerpt = escape_html(&text);
    if options.render_line_returns {
        excerpt = excerpt.trim().replace('\n', "<br>");
    }
    Ok(excerpt)
}
