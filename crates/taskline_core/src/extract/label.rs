//! Label and context heuristics for a date found in prose.
//!
//! # Responsibility
//! - Derive a short human label for a date from the words around it.
//! - Produce a whitespace-collapsed snippet of surrounding text.
//!
//! # Invariants
//! - Never panics; always returns a string, possibly empty.
//! - Labels are at most 62 characters; longer ones are cut to 59 plus `…`.
//! - All windows are measured in characters, not bytes.

use once_cell::sync::Lazy;
use regex::Regex;

const LABEL_LOOKBEHIND_CHARS: usize = 220;
const LABEL_LOOKAHEAD_CHARS: usize = 160;
const CONTEXT_RADIUS_CHARS: usize = 80;
const MIN_LABEL_CHARS: usize = 4;
const MAX_LABEL_CHARS: usize = 62;
const TRUNCATED_LABEL_CHARS: usize = 59;
const ELLIPSIS: char = '…';

static SENTENCE_BREAKS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.\n!?]+").expect("valid sentence break regex"));
static SENTENCE_BREAK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.\n!?]").expect("valid sentence break regex"));
static TRAILING_CONNECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:by|on|is|are|of|in|the|a|an|for|at|to)\s*$")
        .expect("valid trailing connective regex")
});
static TRAILING_PUNCTUATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[:\-–—,]\s*$").expect("valid trailing punctuation regex"));
static LEADING_PUNCTUATION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[,\-–—:\s]+").expect("valid leading punctuation regex"));
static LEADING_CONNECTIVE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(?:by|on|is|at)\s+").expect("valid leading connective regex")
});
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Derives a label for the match at byte span `start..start + len`.
///
/// Rules, in order:
/// - last sentence fragment of the 220 chars before the date, minus one
///   trailing connective word and one trailing `: - – — ,`;
/// - if that is shorter than 4 chars, the first sentence fragment of the
///   160 chars after the date, minus leading punctuation and one leading
///   `by|on|is|at`;
/// - cap at 62 chars.
pub fn extract_label(text: &str, start: usize, len: usize) -> String {
    let (before, after) = split_around(text, start, len);
    let before = tail_chars(before, LABEL_LOOKBEHIND_CHARS);

    let fragment = SENTENCE_BREAKS_RE.split(before).last().unwrap_or("").trim();
    let without_connective = TRAILING_CONNECTIVE_RE.replace(fragment, "");
    let without_punctuation = TRAILING_PUNCTUATION_RE.replace(without_connective.trim(), "");
    let mut label = without_punctuation.trim().to_string();

    if label.chars().count() < MIN_LABEL_CHARS {
        let after = head_chars(after, LABEL_LOOKAHEAD_CHARS);
        let fragment = SENTENCE_BREAK_RE.split(after).next().unwrap_or("");
        let without_punctuation = LEADING_PUNCTUATION_RE.replace(fragment, "");
        let without_connective = LEADING_CONNECTIVE_RE.replace(without_punctuation.trim(), "");
        label = without_connective.trim().to_string();
    }

    if label.chars().count() > MAX_LABEL_CHARS {
        let mut truncated: String = label.chars().take(TRUNCATED_LABEL_CHARS).collect();
        truncated.push(ELLIPSIS);
        return truncated;
    }
    label
}

/// Returns the match plus up to 80 chars on each side, whitespace-collapsed
/// and trimmed.
pub fn extract_context(text: &str, start: usize, len: usize) -> String {
    let (before, after) = split_around(text, start, len);
    let matched = text.get(start..start.saturating_add(len)).unwrap_or("");
    let window = format!(
        "{}{}{}",
        tail_chars(before, CONTEXT_RADIUS_CHARS),
        matched,
        head_chars(after, CONTEXT_RADIUS_CHARS)
    );
    collapse_whitespace(&window)
}

/// Collapses every whitespace run to one space and trims the ends.
pub fn collapse_whitespace(value: &str) -> String {
    WHITESPACE_RE.replace_all(value, " ").trim().to_string()
}

// Out-of-range or non-boundary spans degrade to empty sides instead of
// panicking.
fn split_around(text: &str, start: usize, len: usize) -> (&str, &str) {
    let before = text.get(..start).unwrap_or("");
    let after = text.get(start.saturating_add(len)..).unwrap_or("");
    (before, after)
}

fn tail_chars(value: &str, count: usize) -> &str {
    if count == 0 {
        return "";
    }
    value
        .char_indices()
        .rev()
        .nth(count - 1)
        .map_or(value, |(index, _)| &value[index..])
}

fn head_chars(value: &str, count: usize) -> &str {
    value
        .char_indices()
        .nth(count)
        .map_or(value, |(index, _)| &value[..index])
}
