//! Date extraction from unstructured text.
//!
//! # Responsibility
//! - Run every supported date shape over a text buffer.
//! - Deduplicate by canonical date and annotate each date with a label and
//!   surrounding context.
//!
//! # Invariants
//! - Extraction never fails; malformed or date-free input yields fewer or no
//!   results.
//! - Output is sorted ascending by date and holds each date at most once.
//! - For a date found more than once, the first hit in shape order
//!   (month-day, day-of-month, numeric) then text order wins.
//! - Output depends only on `text` and `today`.

pub mod fetch;
pub mod label;
pub mod lexicon;
pub mod matcher;
pub mod source;
pub mod year;

use crate::model::date::CanonicalDate;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;

pub use label::{extract_context, extract_label};
pub use matcher::{DateMatch, DateShape};
pub use year::normalize_year;

/// One unique date found in a scan, with its derived label and snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedOccurrence {
    pub date: CanonicalDate,
    /// At most 62 characters; may end with `…`; may be empty.
    pub label: String,
    pub context: String,
}

/// Extracts every distinct date mentioned in `text`.
///
/// Dates written without a year take `today`'s year.
pub fn extract_dates(text: &str, today: CanonicalDate) -> Vec<ExtractedOccurrence> {
    let started_at = Instant::now();
    let mut seen = HashSet::new();
    let mut occurrences = Vec::new();
    let mut resolved_total = 0usize;

    for shape in DateShape::ALL {
        for found in matcher::match_dates(shape, text, today.year()) {
            resolved_total += 1;
            if !seen.insert(found.date) {
                continue;
            }
            occurrences.push(ExtractedOccurrence {
                date: found.date,
                label: extract_label(text, found.index, found.length),
                context: extract_context(text, found.index, found.length),
            });
        }
    }

    occurrences.sort_by(|left, right| left.date.cmp(&right.date));

    debug!(
        "event=extract_dates module=extract status=ok text_chars={} resolved={} unique={} duration_ms={}",
        text.chars().count(),
        resolved_total,
        occurrences.len(),
        started_at.elapsed().as_millis()
    );
    occurrences
}
