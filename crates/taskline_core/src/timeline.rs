//! Timeline projection over tasks and date entries.
//!
//! # Invariants
//! - Tasks are keyed by due date, date entries by date.
//! - Items with equal keys keep input order: tasks (in given order) before
//!   date entries (in given order).
//! - `upcoming` holds keys on or after today, ascending; `past` holds keys
//!   before today, most recent first.
//! - Each month group is one consecutive run of the same `YYYY-MM` key.

use crate::model::date::CanonicalDate;
use crate::model::date_entry::DateEntry;
use crate::model::ids::RecordId;
use crate::model::task::Task;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum TimelineItem {
    Task(Task),
    Date(DateEntry),
}

impl TimelineItem {
    pub fn key(&self) -> CanonicalDate {
        match self {
            Self::Task(task) => task.due_date,
            Self::Date(entry) => entry.date,
        }
    }

    pub fn id(&self) -> RecordId {
        match self {
            Self::Task(task) => task.id,
            Self::Date(entry) => entry.id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthGroup {
    pub month_key: String,
    pub items: Vec<TimelineItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Timeline {
    pub upcoming: Vec<MonthGroup>,
    pub past: Vec<MonthGroup>,
}

/// Merges, splits around `today` and groups by month.
pub fn build_timeline(tasks: Vec<Task>, dates: Vec<DateEntry>, today: CanonicalDate) -> Timeline {
    let mut items: Vec<TimelineItem> = tasks
        .into_iter()
        .map(TimelineItem::Task)
        .chain(dates.into_iter().map(TimelineItem::Date))
        .collect();
    // `sort_by_key` is stable.
    items.sort_by_key(TimelineItem::key);

    let (upcoming, mut past): (Vec<_>, Vec<_>) =
        items.into_iter().partition(|item| item.key() >= today);
    past.reverse();

    Timeline {
        upcoming: group_by_month(upcoming),
        past: group_by_month(past),
    }
}

fn group_by_month(items: Vec<TimelineItem>) -> Vec<MonthGroup> {
    let mut groups: Vec<MonthGroup> = Vec::new();
    for item in items {
        let month_key = item.key().month_key();
        match groups.last_mut() {
            Some(group) if group.month_key == month_key => group.items.push(item),
            _ => groups.push(MonthGroup {
                month_key,
                items: vec![item],
            }),
        }
    }
    groups
}
