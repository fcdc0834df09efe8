//! Tolerant JSON extraction from model output
//!
//! Models wrap JSON in markdown fences, surround it with prose, and leave
//! trailing commas. This module repairs exactly those mistakes and nothing
//! more. It is not a parser:
//!
//! - the payload is assumed to start at the first `{` or `[`
//! - the payload ends at the *last* matching closer in the text
//! - nesting inside that span is assumed to be well formed
//! - comma repairs are regex based and also apply inside string values

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static FENCE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)```(?:json)?").expect("valid fence regex"));

static REPEATED_COMMA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(?:\s*,)+").expect("valid repeated comma regex"));

static TRAILING_COMMA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").expect("valid trailing comma regex"));

static LEADING_COMMA_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([{\[])\s*,").expect("valid leading comma regex"));

static ADJACENT_OBJECTS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\}\s*\{").expect("valid adjacent objects regex"));

/// Extracts the candidate JSON span from free-form text
///
/// Returns `None` when the text has no `{`/`[`, or no matching closer
/// after it.
///
/// # Example
///
/// ```
/// use ux_scanner::analysis::json::extract_json;
///
/// let text = "Sure! ```json\n{\"score\": 80,}\n```";
/// assert_eq!(extract_json(text).as_deref(), Some("{\"score\": 80}"));
/// ```
pub fn extract_json(text: &str) -> Option<String> {
    let text = FENCE_REGEX.replace_all(text, "");

    let start = text.find(['{', '['])?;
    let closer = if text[start..].starts_with('{') {
        '}'
    } else {
        ']'
    };
    let end = text.rfind(closer).filter(|&end| end > start)?;

    let candidate = &text[start..=end];
    let candidate = REPEATED_COMMA_REGEX.replace_all(candidate, ",");
    let candidate = TRAILING_COMMA_REGEX.replace_all(&candidate, "$1");

    Some(candidate.into_owned())
}

/// Extracts and parses JSON, with one aggressive repair pass on failure
pub fn try_parse(text: &str) -> Option<Value> {
    let candidate = extract_json(text)?;

    match serde_json::from_str(&candidate) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::debug!("Strict JSON parse failed ({}), attempting repair", e);
            serde_json::from_str(&aggressive_repair(&candidate)).ok()
        }
    }
}

/// Parses `text` as best it can, returning `fallback` unchanged on failure
///
/// Never panics and never errors.
pub fn safe_parse(text: &str, fallback: Value) -> Value {
    try_parse(text).unwrap_or_else(|| {
        tracing::debug!("Model output is not usable JSON, using fallback");
        fallback
    })
}

fn aggressive_repair(candidate: &str) -> String {
    let repaired = ADJACENT_OBJECTS_REGEX.replace_all(candidate, "},{");
    let repaired = REPEATED_COMMA_REGEX.replace_all(&repaired, ",");
    let repaired = LEADING_COMMA_REGEX.replace_all(&repaired, "$1");
    let repaired = TRAILING_COMMA_REGEX.replace_all(&repaired, "$1");
    repaired.into_owned()
}
