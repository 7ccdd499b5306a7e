//! Date entry domain model.
//!
//! A date entry is a standalone calendar marker (deadline, event, holiday)
//! without status or priority.
//!
//! # Invariants
//! - `title` is non-blank.
//! - Rolling over a recurring entry retires it; the next occurrence gets a
//!   new `id`.

use crate::model::date::CanonicalDate;
use crate::model::ids::RecordId;
use crate::model::validation::{require_non_blank, require_unique_projects, ValidationError};
use crate::recurrence::period::RecurrencePeriod;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateEntry {
    pub id: RecordId,
    pub project_ids: Vec<RecordId>,
    pub title: String,
    pub date: CanonicalDate,
    pub repeat: Option<RecurrencePeriod>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateEntryDraft {
    pub project_ids: Vec<RecordId>,
    pub title: String,
    pub date: CanonicalDate,
    pub repeat: Option<RecurrencePeriod>,
    pub notes: Option<String>,
}

impl DateEntryDraft {
    pub fn new(title: impl Into<String>, date: CanonicalDate) -> Self {
        Self {
            project_ids: Vec::new(),
            title: title.into(),
            date,
            repeat: None,
            notes: None,
        }
    }
}

/// Partial update; same `Option<Option<_>>` convention as `TaskPatch`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateEntryPatch {
    pub project_ids: Option<Vec<RecordId>>,
    pub title: Option<String>,
    pub date: Option<CanonicalDate>,
    pub repeat: Option<Option<RecurrencePeriod>>,
    pub notes: Option<Option<String>>,
}

impl DateEntry {
    pub fn from_draft(id: RecordId, draft: DateEntryDraft) -> Self {
        Self {
            id,
            project_ids: draft.project_ids,
            title: draft.title,
            date: draft.date,
            repeat: draft.repeat,
            notes: draft.notes,
        }
    }

    pub fn apply_patch(&mut self, patch: DateEntryPatch) {
        if let Some(project_ids) = patch.project_ids {
            self.project_ids = project_ids;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
        if let Some(repeat) = patch.repeat {
            self.repeat = repeat;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("date entry title", &self.title)?;
        require_unique_projects(&self.project_ids)
    }

    pub fn is_recurring(&self) -> bool {
        self.repeat.is_some()
    }
}
