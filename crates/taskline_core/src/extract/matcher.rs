//! Literal date shape scanners.
//!
//! # Responsibility
//! - Find the three supported date shapes in raw text:
//!   1. `March 3rd, 2025` / `Mar. 3` (month first, suffix/comma/year optional)
//!   2. `3rd of March 2025` (day first, suffix required, year optional)
//!   3. `3/10/2025` (US month/day/year, 2- or 4-digit year)
//! - Resolve a raw match to a `CanonicalDate`.
//!
//! # Invariants
//! - Each shape is scanned over the whole text independently; matches of one
//!   shape never overlap each other, but may overlap other shapes' matches.
//! - A match consumes its span even if it later fails to resolve.
//! - Shapes start and end on word boundaries (ASCII letters, digits and `_`
//!   are word characters).

use crate::extract::{lexicon, year};
use crate::model::date::{CanonicalDate, DateError};
use log::trace;
use std::fmt::{Display, Formatter};

/// Supported literal date shapes, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateShape {
    MonthDay,
    DayOfMonth,
    Numeric,
}

impl DateShape {
    pub const ALL: [DateShape; 3] = [Self::MonthDay, Self::DayOfMonth, Self::Numeric];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::MonthDay => "month_day",
            Self::DayOfMonth => "day_of_month",
            Self::Numeric => "numeric",
        }
    }
}

/// Month as written: a name/abbreviation or a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthField<'t> {
    Name(&'t str),
    Number(&'t str),
}

/// Unresolved match: byte span plus the raw field tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMatch<'t> {
    pub shape: DateShape,
    /// Byte offset of the first matched byte.
    pub start: usize,
    /// Byte offset one past the last matched byte.
    pub end: usize,
    pub month: MonthField<'t>,
    pub day: &'t str,
    pub year: Option<&'t str>,
}

/// Why a raw match did not produce a date. Never surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    UnrecognizedToken(String),
    InvalidCalendarDate(DateError),
}

impl Display for Rejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnrecognizedToken(token) => write!(f, "unrecognized token `{token}`"),
            Self::InvalidCalendarDate(err) => write!(f, "{err}"),
        }
    }
}

/// A match that resolved to a real date: byte offset and byte length of the
/// matched text, plus the date it names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateMatch {
    pub index: usize,
    pub length: usize,
    pub date: CanonicalDate,
}

impl RawMatch<'_> {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// Resolves month, day and year; a missing year becomes `reference_year`.
    pub fn resolve(&self, reference_year: i32) -> Result<CanonicalDate, Rejection> {
        let month = match self.month {
            MonthField::Name(token) => lexicon::month_number(token)
                .ok_or_else(|| Rejection::UnrecognizedToken(token.to_string()))?,
            MonthField::Number(digits) => parse_field(digits)?,
        };
        let day = parse_field(self.day)?;
        let year = match self.year {
            Some(token) => year::resolve_year(token)
                .ok_or_else(|| Rejection::UnrecognizedToken(token.to_string()))?,
            None => reference_year,
        };
        CanonicalDate::from_ymd(year, month, day).map_err(Rejection::InvalidCalendarDate)
    }
}

/// Scans `text` for every non-overlapping occurrence of `shape`.
pub fn scan(shape: DateShape, text: &str) -> Vec<RawMatch<'_>> {
    let parse: fn(&str, usize) -> Option<RawMatch<'_>> = match shape {
        DateShape::MonthDay => parse_month_day,
        DateShape::DayOfMonth => parse_day_of_month,
        DateShape::Numeric => parse_numeric,
    };

    let bytes = text.as_bytes();
    let mut matches = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        if at_word_start(bytes, pos) {
            if let Some(found) = parse(text, pos) {
                pos = found.end;
                matches.push(found);
                continue;
            }
        }
        pos += 1;
    }
    matches
}

/// Scans and resolves, dropping matches that are not real dates.
pub fn match_dates(shape: DateShape, text: &str, reference_year: i32) -> Vec<DateMatch> {
    scan(shape, text)
        .into_iter()
        .filter_map(|raw| match raw.resolve(reference_year) {
            Ok(date) => Some(DateMatch {
                index: raw.start,
                length: raw.len(),
                date,
            }),
            Err(rejection) => {
                trace!(
                    "event=date_candidate_rejected module=extract shape={} offset={} reason={}",
                    shape.as_str(),
                    raw.start,
                    rejection
                );
                None
            }
        })
        .collect()
}

/// `<Month>[.] <Day>[st|nd|rd|th][,] [<Year>]`
pub fn parse_month_day(text: &str, start: usize) -> Option<RawMatch<'_>> {
    let bytes = text.as_bytes();
    let (month_end, month) = month_token(text, start)?;

    let day_start = skip_whitespace(text, month_end);
    if day_start == month_end {
        return None;
    }
    let day_end = digit_run(bytes, day_start);
    if !(1..=2).contains(&(day_end - day_start)) {
        return None;
    }
    let mut end = ordinal_suffix(bytes, day_end).unwrap_or(day_end);
    if !boundary_at(bytes, end) {
        return None;
    }

    let mut cursor = end;
    if bytes.get(cursor) == Some(&b',') {
        cursor += 1;
    }
    cursor = skip_whitespace(text, cursor);
    let year = year_token(text, cursor);
    if let Some(token) = year {
        end = cursor + token.len();
    }

    Some(RawMatch {
        shape: DateShape::MonthDay,
        start,
        end,
        month: MonthField::Name(month),
        day: &text[day_start..day_end],
        year,
    })
}

/// `<Day>(st|nd|rd|th) of <Month>[.][ <Year>]`
pub fn parse_day_of_month(text: &str, start: usize) -> Option<RawMatch<'_>> {
    let bytes = text.as_bytes();
    let day_end = digit_run(bytes, start);
    if !(1..=2).contains(&(day_end - start)) {
        return None;
    }
    let suffix_end = ordinal_suffix(bytes, day_end)?;

    let of_start = skip_whitespace(text, suffix_end);
    if of_start == suffix_end || !starts_with_ignore_case(bytes, of_start, b"of") {
        return None;
    }
    let month_start = skip_whitespace(text, of_start + 2);
    if month_start == of_start + 2 {
        return None;
    }
    let (mut end, month) = month_token(text, month_start)?;
    if !month.ends_with('.') && !boundary_at(bytes, end) {
        return None;
    }

    let year_start = skip_whitespace(text, end);
    let year = if year_start > end {
        year_token(text, year_start)
    } else {
        None
    };
    if let Some(token) = year {
        end = year_start + token.len();
    }

    Some(RawMatch {
        shape: DateShape::DayOfMonth,
        start,
        end,
        month: MonthField::Name(month),
        day: &text[start..day_end],
        year,
    })
}

/// `<Month>/<Day>/<Year>` with 1-2 digit month/day and 2- or 4-digit year.
pub fn parse_numeric(text: &str, start: usize) -> Option<RawMatch<'_>> {
    let bytes = text.as_bytes();
    let month_end = digit_run(bytes, start);
    if !(1..=2).contains(&(month_end - start)) || bytes.get(month_end) != Some(&b'/') {
        return None;
    }
    let day_start = month_end + 1;
    let day_end = digit_run(bytes, day_start);
    if !(1..=2).contains(&(day_end - day_start)) || bytes.get(day_end) != Some(&b'/') {
        return None;
    }
    let year = year_token(text, day_end + 1)?;

    Some(RawMatch {
        shape: DateShape::Numeric,
        start,
        end: day_end + 1 + year.len(),
        month: MonthField::Number(&text[start..month_end]),
        day: &text[day_start..day_end],
        year: Some(year),
    })
}

// Month name or abbreviation at `start`; abbreviations may take one `.`.
fn month_token(text: &str, start: usize) -> Option<(usize, &str)> {
    let bytes = text.as_bytes();
    let word_end = alpha_run(bytes, start);
    if word_end == start {
        return None;
    }
    let word = lexicon::lookup(&text[start..word_end])?;
    if word.abbreviated && bytes.get(word_end) == Some(&b'.') {
        return Some((word_end + 1, &text[start..=word_end]));
    }
    Some((word_end, &text[start..word_end]))
}

// Exactly two or four digits followed by a word boundary.
fn year_token(text: &str, start: usize) -> Option<&str> {
    let bytes = text.as_bytes();
    let end = digit_run(bytes, start);
    let width = end - start;
    if (width == 2 || width == 4) && boundary_at(bytes, end) {
        Some(&text[start..end])
    } else {
        None
    }
}

fn parse_field(digits: &str) -> Result<u32, Rejection> {
    digits
        .parse()
        .map_err(|_| Rejection::UnrecognizedToken(digits.to_string()))
}

fn ordinal_suffix(bytes: &[u8], pos: usize) -> Option<usize> {
    const SUFFIXES: [&[u8]; 4] = [b"st", b"nd", b"rd", b"th"];
    SUFFIXES
        .iter()
        .any(|suffix| starts_with_ignore_case(bytes, pos, suffix))
        .then_some(pos + 2)
}

fn starts_with_ignore_case(bytes: &[u8], pos: usize, needle: &[u8]) -> bool {
    bytes
        .get(pos..pos + needle.len())
        .is_some_and(|window| window.eq_ignore_ascii_case(needle))
}

fn is_word_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || byte == b'_'
}

fn at_word_start(bytes: &[u8], pos: usize) -> bool {
    is_word_byte(bytes[pos]) && (pos == 0 || !is_word_byte(bytes[pos - 1]))
}

// Callers only ask right after a word byte, so this is `\b`.
fn boundary_at(bytes: &[u8], pos: usize) -> bool {
    bytes.get(pos).map_or(true, |&byte| !is_word_byte(byte))
}

fn digit_run(bytes: &[u8], start: usize) -> usize {
    run_end(bytes, start, |byte| byte.is_ascii_digit())
}

fn alpha_run(bytes: &[u8], start: usize) -> usize {
    run_end(bytes, start, |byte| byte.is_ascii_alphabetic())
}

// Unicode whitespace, so NBSP and friends from decoded documents separate
// tokens too.
fn skip_whitespace(text: &str, start: usize) -> usize {
    text.get(start..).map_or(start, |rest| {
        start + rest.len() - rest.trim_start().len()
    })
}

fn run_end(bytes: &[u8], start: usize, accept: impl Fn(u8) -> bool) -> usize {
    let mut end = start;
    while end < bytes.len() && accept(bytes[end]) {
        end += 1;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::{
        match_dates, parse_day_of_month, parse_month_day, parse_numeric, scan, DateShape,
        MonthField, Rejection,
    };

    fn dates(shape: DateShape, text: &str) -> Vec<String> {
        match_dates(shape, text, 2026)
            .into_iter()
            .map(|found| found.date.to_string())
            .collect()
    }

    #[test]
    fn month_day_with_suffix_comma_and_year() {
        let found = parse_month_day("March 3rd, 2025 and", 0).unwrap();
        assert_eq!(found.month, MonthField::Name("March"));
        assert_eq!(found.day, "3");
        assert_eq!(found.year, Some("2025"));
        assert_eq!(found.len(), "March 3rd, 2025".len());
    }

    #[test]
    fn month_day_without_year_ends_after_day() {
        let found = parse_month_day("June 15, then lunch", 0).unwrap();
        assert_eq!(found.year, None);
        assert_eq!(found.end, "June 15".len());
    }

    #[test]
    fn month_day_accepts_dotted_abbreviation_and_two_digit_year() {
        let found = parse_month_day("Sept. 9 '24 or Sept. 9 24", 0).unwrap();
        assert_eq!(found.month, MonthField::Name("Sept."));
        assert_eq!(found.year, None);
        assert_eq!(dates(DateShape::MonthDay, "Sept. 9 24"), vec!["2024-09-09"]);
        assert_eq!(dates(DateShape::MonthDay, "dec 1, 99"), vec!["1999-12-01"]);
    }

    #[test]
    fn month_day_requires_word_boundaries() {
        assert!(parse_month_day("Marching 3", 0).is_none());
        assert!(parse_month_day("March 3x", 0).is_none());
        assert!(parse_month_day("March 123", 0).is_none());
        assert!(parse_month_day("March2", 0).is_none());
        assert!(parse_month_day("May. 4", 0).is_none());
        assert!(dates(DateShape::MonthDay, "summarize the march 5 notes").len() == 1);
        assert!(dates(DateShape::MonthDay, "primary 5").is_empty());
    }

    #[test]
    fn month_day_ignores_odd_width_years() {
        let found = parse_month_day("April 5 123 apples", 0).unwrap();
        assert_eq!(found.year, None);
        assert_eq!(dates(DateShape::MonthDay, "April 5 123"), vec!["2026-04-05"]);
    }

    #[test]
    fn day_of_month_requires_suffix_and_of() {
        let found = parse_day_of_month("21st of Oct. 2024.", 0).unwrap();
        assert_eq!(found.day, "21");
        assert_eq!(found.month, MonthField::Name("Oct."));
        assert_eq!(found.year, Some("2024"));
        assert!(parse_day_of_month("21 of October", 0).is_none());
        assert!(parse_day_of_month("21st October", 0).is_none());
        assert!(parse_day_of_month("21st of Octobers", 0).is_none());
        assert_eq!(
            dates(DateShape::DayOfMonth, "the 2ND OF MAY is fine"),
            vec!["2026-05-02"]
        );
    }

    #[test]
    fn numeric_is_month_first() {
        let found = parse_numeric("3/10/2025", 0).unwrap();
        assert_eq!(found.month, MonthField::Number("3"));
        assert_eq!(found.day, "10");
        assert_eq!(dates(DateShape::Numeric, "on 3/10/2025."), vec!["2025-03-10"]);
        assert_eq!(dates(DateShape::Numeric, "12/25/49"), vec!["2049-12-25"]);
    }

    #[test]
    fn numeric_rejects_bad_widths() {
        assert!(dates(DateShape::Numeric, "3/10/202").is_empty());
        assert!(dates(DateShape::Numeric, "3/10/20255").is_empty());
        assert!(dates(DateShape::Numeric, "123/4/2024").is_empty());
        assert!(dates(DateShape::Numeric, "1/2/2024x").is_empty());
    }

    #[test]
    fn impossible_dates_are_dropped_but_still_consume_their_span() {
        let raw = scan(DateShape::Numeric, "2/30/2025 then 2/28/2025");
        assert_eq!(raw.len(), 2);
        assert!(matches!(
            raw[0].resolve(2026),
            Err(Rejection::InvalidCalendarDate(_))
        ));
        assert_eq!(
            dates(DateShape::Numeric, "2/30/2025 then 2/28/2025"),
            vec!["2025-02-28"]
        );
        assert!(dates(DateShape::Numeric, "13/01/2025").is_empty());
        assert!(dates(DateShape::MonthDay, "April 31, 2025").is_empty());
    }

    #[test]
    fn missing_year_uses_reference_year() {
        assert_eq!(dates(DateShape::MonthDay, "due Feb 29"), Vec::<String>::new());
        assert_eq!(
            match_dates(DateShape::MonthDay, "due Feb 29", 2028)[0]
                .date
                .to_string(),
            "2028-02-29"
        );
    }

    #[test]
    fn non_ascii_text_is_scanned_safely() {
        assert_eq!(
            dates(DateShape::MonthDay, "Réunion — janvier? no: «March 4, 2027»"),
            vec!["2027-03-04"]
        );
        assert!(dates(DateShape::Numeric, "日本 1/2/03").len() == 1);
    }

    #[test]
    fn matches_are_reported_with_byte_spans() {
        let found = match_dates(DateShape::Numeric, "see 1/2/2030 now", 2026);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].index, 4);
        assert_eq!(found[0].length, 8);
    }

    #[test]
    fn unicode_spaces_separate_tokens() {
        assert_eq!(
            dates(DateShape::MonthDay, "Deadline March\u{a0}3,\u{2009}2025."),
            vec!["2025-03-03"]
        );
        assert_eq!(
            dates(DateShape::DayOfMonth, "the 1st\u{a0}of\u{3000}May\u{a0}2027"),
            vec!["2027-05-01"]
        );
        let found = match_dates(DateShape::MonthDay, "Due March\u{a0}3, 2025", 2026);
        assert_eq!(found[0].index, 4);
        assert_eq!(found[0].length, "March\u{a0}3, 2025".len());
    }
}
