//! JSON payload extraction from free-form provider replies.
//!
//! Generative providers are asked for JSON only, but in practice wrap
//! the payload in markdown fences, commentary, or both. [`extract_json`]
//! applies three strategies in order and returns the first hit:
//!
//! 1. A ```json fenced block -- interior, trimmed.
//! 2. A brace-balanced region starting at the first `{` -- the only
//!    strategy that is safe against nested objects and trailing braces.
//! 3. The naive first-`{` / last-`}` substring.
//!
//! The result is a *candidate*: it is not guaranteed to parse. Parsing
//! and schema enforcement belong to [`crate::validate`].

use std::sync::OnceLock;

use regex::Regex;

/// Extraction failed on all strategies.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExtractError {
    /// The reply contains no recognizable JSON object.
    #[error("no JSON object found in provider reply")]
    NoJsonFound,
}

/// Isolate the JSON payload embedded in `raw`.
///
/// Idempotent: running the extractor on its own output returns the same
/// string.
pub fn extract_json(raw: &str) -> Result<String, ExtractError> {
    if let Some(fenced) = fenced_block(raw) {
        return Ok(fenced);
    }
    if let Some(balanced) = balanced_object(raw) {
        return Ok(balanced);
    }
    if let Some(naive) = first_to_last_brace(raw) {
        return Ok(naive);
    }
    Err(ExtractError::NoJsonFound)
}

/// Strategy 1: interior of a ```json fenced block, trimmed.
fn fenced_block(raw: &str) -> Option<String> {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| {
        Regex::new(r"(?s)```json\s*(.+?)```").expect("fence regex is valid")
    });
    fence
        .captures(raw)
        .map(|caps| caps[1].trim().to_string())
}

/// Strategy 2: brace-balanced region from the first `{`.
///
/// Tracks nesting depth while skipping string literals (including
/// escaped quotes), so nested objects and stray braces inside strings
/// do not fool it. Returns `None` when the region never closes.
fn balanced_object(raw: &str) -> Option<String> {
    let start = raw.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in raw[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(raw[start..start + offset + ch.len_utf8()].to_string());
                }
            }
            _ => {}
        }
    }
    None
}

/// Strategy 3: everything from the first `{` to the last `}`.
fn first_to_last_brace(raw: &str) -> Option<String> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end > start {
        Some(raw[start..=end].to_string())
    } else {
        None
    }
}
