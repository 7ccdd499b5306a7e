//! Recurrence periods and next-occurrence arithmetic.
//!
//! # Responsibility
//! - Define the closed set of repeat periods.
//! - Compute the next occurrence date for a period.
//!
//! # Invariants
//! - Day-based periods add whole days.
//! - Month-based periods keep the day-of-month and let it overflow into the
//!   following month when the target month is shorter: `2024-01-31` monthly
//!   is `2024-03-02`, `2024-02-29` yearly is `2025-03-01`.
//! - There is no occurrence after `9999-12-31`'s period; callers get `None`
//!   instead of a date with a five-digit year.

use crate::model::date::{CanonicalDate, DateError};
use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Errors from string-level recurrence entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurrenceError {
    /// Period text outside `daily|weekly|biweekly|monthly|yearly`.
    InvalidRecurrencePeriod(String),
    /// Date text is not a valid canonical date.
    InvalidCalendarDate(DateError),
    /// The next occurrence would fall after year 9999.
    NoNextOccurrence {
        date: CanonicalDate,
        period: RecurrencePeriod,
    },
}

impl Display for RecurrenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidRecurrencePeriod(value) => write!(
                f,
                "invalid recurrence period `{value}`; expected daily|weekly|biweekly|monthly|yearly"
            ),
            Self::InvalidCalendarDate(err) => write!(f, "{err}"),
            Self::NoNextOccurrence { date, period } => {
                write!(f, "no {period} occurrence after {date} fits in four-digit years")
            }
        }
    }
}

impl Error for RecurrenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCalendarDate(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DateError> for RecurrenceError {
    fn from(value: DateError) -> Self {
        Self::InvalidCalendarDate(value)
    }
}

/// How often a task or date entry repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePeriod {
    Daily,
    Weekly,
    Biweekly,
    Monthly,
    Yearly,
}

impl RecurrencePeriod {
    /// Stable storage/wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Returns the occurrence that follows `date`, or `None` when it would
    /// land after `9999-12-31`.
    pub fn advance(self, date: CanonicalDate) -> Option<CanonicalDate> {
        let current = date.as_naive();
        let next = match self {
            Self::Daily => current.checked_add_days(Days::new(1)),
            Self::Weekly => current.checked_add_days(Days::new(7)),
            Self::Biweekly => current.checked_add_days(Days::new(14)),
            Self::Monthly => add_months_with_overflow(current, 1),
            Self::Yearly => add_months_with_overflow(current, 12),
        };
        next.and_then(|next| CanonicalDate::try_from(next).ok())
    }
}

impl Display for RecurrencePeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecurrencePeriod {
    type Err = RecurrenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(RecurrenceError::InvalidRecurrencePeriod(other.to_string())),
        }
    }
}

/// String-level advancer: `("2024-03-15", "weekly") -> "2024-03-22"`.
pub fn advance_date(date: &str, period: &str) -> Result<String, RecurrenceError> {
    let date = CanonicalDate::parse(date)?;
    let period = period.parse::<RecurrencePeriod>()?;
    period
        .advance(date)
        .map(|next| next.to_string())
        .ok_or(RecurrenceError::NoNextOccurrence { date, period })
}

// Moves to the first of the target month, then re-adds the original
// day offset so short months spill forward.
fn add_months_with_overflow(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    let first_of_month = date.with_day(1)?;
    let target = first_of_month.checked_add_months(Months::new(months))?;
    target.checked_add_days(Days::new(u64::from(date.day() - 1)))
}

#[cfg(test)]
mod tests {
    use super::{advance_date, RecurrenceError, RecurrencePeriod};
    use crate::model::date::CanonicalDate;

    #[test]
    fn period_names_round_trip_through_from_str() {
        for period in [
            RecurrencePeriod::Daily,
            RecurrencePeriod::Weekly,
            RecurrencePeriod::Biweekly,
            RecurrencePeriod::Monthly,
            RecurrencePeriod::Yearly,
        ] {
            assert_eq!(period.as_str().parse::<RecurrencePeriod>(), Ok(period));
        }
    }

    #[test]
    fn unknown_period_is_rejected() {
        let err = advance_date("2024-03-15", "fortnightly").unwrap_err();
        assert_eq!(
            err,
            RecurrenceError::InvalidRecurrencePeriod("fortnightly".to_string())
        );
        assert!("Weekly".parse::<RecurrencePeriod>().is_err());
    }

    #[test]
    fn malformed_date_is_rejected() {
        let err = advance_date("2024-02-30", "daily").unwrap_err();
        assert!(matches!(err, RecurrenceError::InvalidCalendarDate(_)));
    }

    #[test]
    fn monthly_keeps_day_when_target_month_is_long_enough() {
        assert_eq!(advance_date("2024-01-15", "monthly").unwrap(), "2024-02-15");
        assert_eq!(advance_date("2024-12-10", "monthly").unwrap(), "2025-01-10");
    }

    #[test]
    fn last_representable_year_has_no_successor_past_it() {
        assert_eq!(advance_date("9999-12-30", "daily").unwrap(), "9999-12-31");
        assert_eq!(
            advance_date("9999-12-31", "daily").unwrap_err(),
            RecurrenceError::NoNextOccurrence {
                date: CanonicalDate::parse("9999-12-31").unwrap(),
                period: RecurrencePeriod::Daily,
            }
        );
        let december = CanonicalDate::parse("9999-12-01").unwrap();
        assert_eq!(RecurrencePeriod::Monthly.advance(december), None);
        assert_eq!(RecurrencePeriod::Yearly.advance(december), None);
    }
}
