//! Canonical calendar date.
//!
//! # Responsibility
//! - Represent a real Gregorian date in `YYYY-MM-DD` form.
//! - Reject impossible month/day combinations instead of clamping them.
//!
//! # Invariants
//! - A `CanonicalDate` always wraps a valid calendar date in years
//!   `0000..=9999`, so its text form is always exactly ten characters.
//! - `Display` output and string ordering agree with calendar ordering.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A year/month/day triple that does not name a real calendar date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// Input is not shaped like `YYYY-MM-DD`.
    Malformed(String),
    /// Fields are well-formed but the day does not exist (e.g. `2025-02-30`).
    InvalidCalendarDate { year: i32, month: u32, day: u32 },
    /// Real date whose year has no four-digit form.
    OutOfRange(NaiveDate),
}

impl Display for DateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => write!(f, "date `{value}` is not in YYYY-MM-DD form"),
            Self::InvalidCalendarDate { year, month, day } => {
                write!(f, "{year:04}-{month:02}-{day:02} is not a calendar date")
            }
            Self::OutOfRange(date) => write!(f, "{date} is outside years 0000..=9999"),
        }
    }
}

impl Error for DateError {}

const MAX_YEAR: i32 = 9999;

/// Local calendar date with no time or timezone component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalDate(NaiveDate);

impl CanonicalDate {
    /// Builds a date from numeric fields.
    ///
    /// # Errors
    /// - `DateError::InvalidCalendarDate` when the day does not exist in
    ///   that month/year.
    /// - `DateError::OutOfRange` for years outside `0..=9999`.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Result<Self, DateError> {
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or(DateError::InvalidCalendarDate { year, month, day })?;
        Self::try_from(date)
    }

    /// Parses strict `YYYY-MM-DD` text (four-digit year, two-digit month/day).
    pub fn parse(value: &str) -> Result<Self, DateError> {
        let bytes = value.as_bytes();
        let shaped = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(index, byte)| index == 4 || index == 7 || byte.is_ascii_digit());
        if !shaped {
            return Err(DateError::Malformed(value.to_string()));
        }

        let field = |range: std::ops::Range<usize>| -> Result<u32, DateError> {
            value[range]
                .parse::<u32>()
                .map_err(|_| DateError::Malformed(value.to_string()))
        };
        let year = i32::try_from(field(0..4)?)
            .map_err(|_| DateError::Malformed(value.to_string()))?;
        Self::from_ymd(year, field(5..7)?, field(8..10)?)
    }

    pub fn year(self) -> i32 {
        self.0.year()
    }

    pub fn month(self) -> u32 {
        self.0.month()
    }

    pub fn day(self) -> u32 {
        self.0.day()
    }

    /// `YYYY-MM` grouping key used by month-bucketed views.
    pub fn month_key(self) -> String {
        format!("{:04}-{:02}", self.year(), self.month())
    }

    pub fn as_naive(self) -> NaiveDate {
        self.0
    }
}

impl TryFrom<NaiveDate> for CanonicalDate {
    type Error = DateError;

    fn try_from(value: NaiveDate) -> Result<Self, Self::Error> {
        if (0..=MAX_YEAR).contains(&value.year()) {
            Ok(Self(value))
        } else {
            Err(DateError::OutOfRange(value))
        }
    }
}

impl Display for CanonicalDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.year(),
            self.month(),
            self.day()
        )
    }
}

impl FromStr for CanonicalDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for CanonicalDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CanonicalDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{CanonicalDate, DateError};

    #[test]
    fn parse_accepts_leap_day() {
        let date = CanonicalDate::parse("2024-02-29").expect("leap day should parse");
        assert_eq!(date.to_string(), "2024-02-29");
        assert_eq!(date.month_key(), "2024-02");
    }

    #[test]
    fn impossible_days_are_rejected_not_clamped() {
        assert!(matches!(
            CanonicalDate::parse("2025-02-29"),
            Err(DateError::InvalidCalendarDate { day: 29, .. })
        ));
        assert!(CanonicalDate::from_ymd(2025, 4, 31).is_err());
        assert!(CanonicalDate::from_ymd(2025, 13, 1).is_err());
    }

    #[test]
    fn parse_rejects_loose_shapes() {
        for raw in ["2025-3-01", "25-03-01", "2025/03/01", "2025-03-01T00:00", ""] {
            assert!(
                matches!(CanonicalDate::parse(raw), Err(DateError::Malformed(_))),
                "`{raw}` should be malformed"
            );
        }
    }

    #[test]
    fn five_digit_years_are_out_of_range() {
        let last = chrono::NaiveDate::from_ymd_opt(9999, 12, 31).unwrap();
        assert_eq!(CanonicalDate::try_from(last).unwrap().to_string(), "9999-12-31");

        let beyond = last.succ_opt().unwrap();
        assert_eq!(
            CanonicalDate::try_from(beyond),
            Err(DateError::OutOfRange(beyond))
        );
        assert!(matches!(
            CanonicalDate::from_ymd(-1, 1, 1),
            Err(DateError::OutOfRange(_))
        ));
    }

    #[test]
    fn string_order_matches_calendar_order() {
        let earlier = CanonicalDate::from_ymd(2024, 12, 31).unwrap();
        let later = CanonicalDate::from_ymd(2025, 1, 1).unwrap();
        assert!(earlier < later);
        assert!(earlier.to_string() < later.to_string());
    }
}
