//! Occurrence rollover transitions.
//!
//! # Responsibility
//! - Compute the records that result from completing a recurring item.
//!
//! # Invariants
//! - Tasks accumulate history: the completed task keeps its id and dates and
//!   is only marked `done`; the next occurrence is a separate task.
//! - Date entries do not: the completed entry is retired and exactly one new
//!   entry with a new id replaces it.
//! - A record without a recurrence period cannot roll over.
//! - A record whose next occurrence would pass `9999-12-31` cannot roll
//!   over either; nothing is produced for it.

use crate::model::date_entry::DateEntry;
use crate::model::ids::RecordId;
use crate::model::task::{Task, TaskStatus};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RolloverError {
    /// The record has no recurrence period.
    NoRecurrenceConfigured(RecordId),
    /// Advancing the record's dates would leave four-digit years.
    NoNextOccurrence(RecordId),
}

impl Display for RolloverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRecurrenceConfigured(id) => write!(f, "this item does not repeat: {id}"),
            Self::NoNextOccurrence(id) => {
                write!(f, "next occurrence is past 9999-12-31: {id}")
            }
        }
    }
}

impl Error for RolloverError {}

/// Result of completing a recurring task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRollover {
    /// The original task, same id and dates, status `done`.
    pub completed: Task,
    /// Freshly identified successor, status `not-started`.
    pub next: Task,
}

/// Result of completing a recurring date entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateEntryRollover {
    /// Identity that must disappear from the store.
    pub retired: RecordId,
    pub next: DateEntry,
}

/// Completes `task` and builds its next occurrence under `next_id`.
///
/// Due date and (when present) start date both move by the task's period;
/// every other field is carried over verbatim.
pub fn roll_over_task(task: &Task, next_id: RecordId) -> Result<TaskRollover, RolloverError> {
    let period = task
        .repeat
        .ok_or(RolloverError::NoRecurrenceConfigured(task.id))?;

    let out_of_range = || RolloverError::NoNextOccurrence(task.id);
    let due_date = period.advance(task.due_date).ok_or_else(out_of_range)?;
    let start_date = match task.start_date {
        Some(start) => Some(period.advance(start).ok_or_else(out_of_range)?),
        None => None,
    };

    let mut completed = task.clone();
    completed.status = TaskStatus::Done;

    let next = Task {
        id: next_id,
        status: TaskStatus::NotStarted,
        due_date,
        start_date,
        ..task.clone()
    };

    Ok(TaskRollover { completed, next })
}

/// Retires `entry` and builds its replacement under `next_id`.
pub fn roll_over_date_entry(
    entry: &DateEntry,
    next_id: RecordId,
) -> Result<DateEntryRollover, RolloverError> {
    let period = entry
        .repeat
        .ok_or(RolloverError::NoRecurrenceConfigured(entry.id))?;

    let date = period
        .advance(entry.date)
        .ok_or(RolloverError::NoNextOccurrence(entry.id))?;

    Ok(DateEntryRollover {
        retired: entry.id,
        next: DateEntry {
            id: next_id,
            date,
            ..entry.clone()
        },
    })
}

#[cfg(test)]
mod tests {
    use super::{roll_over_date_entry, roll_over_task, RolloverError};
    use crate::model::date::CanonicalDate;
    use crate::model::date_entry::{DateEntry, DateEntryDraft};
    use crate::model::task::{Priority, Task, TaskDraft, TaskStatus};
    use crate::recurrence::period::RecurrencePeriod;
    use uuid::Uuid;

    fn date(raw: &str) -> CanonicalDate {
        CanonicalDate::parse(raw).unwrap()
    }

    #[test]
    fn task_rollover_keeps_original_and_advances_successor() {
        let mut draft = TaskDraft::new("Send budget summary", date("2024-03-15"));
        draft.start_date = Some(date("2024-03-11"));
        draft.status = TaskStatus::InProgress;
        draft.priority = Priority::High;
        draft.repeat = Some(RecurrencePeriod::Weekly);
        draft.url = Some("https://example.edu/budget".to_string());
        draft.project_ids = vec![Uuid::from_u128(40)];
        let task = Task::from_draft(Uuid::from_u128(1), draft);

        let rollover = roll_over_task(&task, Uuid::from_u128(2)).unwrap();

        assert_eq!(rollover.completed.id, task.id);
        assert_eq!(rollover.completed.status, TaskStatus::Done);
        assert_eq!(rollover.completed.due_date, task.due_date);
        assert_eq!(rollover.completed.start_date, task.start_date);

        let next = rollover.next;
        assert_eq!(next.id, Uuid::from_u128(2));
        assert_eq!(next.status, TaskStatus::NotStarted);
        assert_eq!(next.due_date, date("2024-03-22"));
        assert_eq!(next.start_date, Some(date("2024-03-18")));
        assert_eq!(next.title, task.title);
        assert_eq!(next.priority, Priority::High);
        assert_eq!(next.url, task.url);
        assert_eq!(next.project_ids, task.project_ids);
        assert_eq!(next.repeat, Some(RecurrencePeriod::Weekly));
    }

    #[test]
    fn task_without_start_date_keeps_it_absent() {
        let mut draft = TaskDraft::new("Monthly report", date("2024-01-31"));
        draft.repeat = Some(RecurrencePeriod::Monthly);
        let task = Task::from_draft(Uuid::from_u128(1), draft);

        let next = roll_over_task(&task, Uuid::from_u128(2)).unwrap().next;
        assert_eq!(next.start_date, None);
        assert_eq!(next.due_date, date("2024-03-02"));
    }

    #[test]
    fn non_recurring_records_are_rejected() {
        let task = Task::from_draft(
            Uuid::from_u128(1),
            TaskDraft::new("One-off", date("2024-05-01")),
        );
        assert_eq!(
            roll_over_task(&task, Uuid::from_u128(2)).unwrap_err(),
            RolloverError::NoRecurrenceConfigured(task.id)
        );

        let entry = DateEntry::from_draft(
            Uuid::from_u128(3),
            DateEntryDraft::new("Commencement", date("2024-05-18")),
        );
        assert_eq!(
            roll_over_date_entry(&entry, Uuid::from_u128(4)).unwrap_err(),
            RolloverError::NoRecurrenceConfigured(entry.id)
        );
    }

    #[test]
    fn date_entry_rollover_retires_old_identity() {
        let mut draft = DateEntryDraft::new("Fee deadline", date("2024-02-29"));
        draft.repeat = Some(RecurrencePeriod::Yearly);
        draft.notes = Some("bursar".to_string());
        let entry = DateEntry::from_draft(Uuid::from_u128(10), draft);

        let rollover = roll_over_date_entry(&entry, Uuid::from_u128(11)).unwrap();
        assert_eq!(rollover.retired, Uuid::from_u128(10));
        assert_eq!(rollover.next.id, Uuid::from_u128(11));
        assert_eq!(rollover.next.date, date("2025-03-01"));
        assert_eq!(rollover.next.notes.as_deref(), Some("bursar"));
        assert_eq!(rollover.next.title, "Fee deadline");
    }

    #[test]
    fn rollover_past_year_9999_is_refused() {
        let mut draft = TaskDraft::new("Millennium check", date("9999-12-31"));
        draft.repeat = Some(RecurrencePeriod::Daily);
        let task = Task::from_draft(Uuid::from_u128(1), draft);
        assert_eq!(
            roll_over_task(&task, Uuid::from_u128(2)).unwrap_err(),
            RolloverError::NoNextOccurrence(task.id)
        );

        let mut draft = DateEntryDraft::new("Far future", date("9999-06-01"));
        draft.repeat = Some(RecurrencePeriod::Yearly);
        let entry = DateEntry::from_draft(Uuid::from_u128(3), draft);
        assert_eq!(
            roll_over_date_entry(&entry, Uuid::from_u128(4)).unwrap_err(),
            RolloverError::NoNextOccurrence(entry.id)
        );
    }
}
