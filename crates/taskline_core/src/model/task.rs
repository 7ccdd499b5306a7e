//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record and its status/priority vocabularies.
//! - Provide draft and patch shapes for create/update use-cases.
//!
//! # Invariants
//! - `id` is stable for the whole life of a task and never reused.
//! - `title` is non-blank.
//! - `project_ids` holds no duplicates and keeps caller order.

use crate::model::date::CanonicalDate;
use crate::model::ids::RecordId;
use crate::model::validation::{require_non_blank, require_unique_projects, ValidationError};
use crate::recurrence::period::RecurrencePeriod;
use serde::{Deserialize, Serialize};

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Initial state for new tasks and for every rolled-over occurrence.
    NotStarted,
    InProgress,
    Done,
    Blocked,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "not-started",
            Self::InProgress => "in-progress",
            Self::Done => "done",
            Self::Blocked => "blocked",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "not-started" => Some(Self::NotStarted),
            "in-progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            "blocked" => Some(Self::Blocked),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "high" => Some(Self::High),
            "medium" => Some(Self::Medium),
            "low" => Some(Self::Low),
            _ => None,
        }
    }
}

/// Canonical task record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: RecordId,
    pub project_ids: Vec<RecordId>,
    pub title: String,
    pub start_date: Option<CanonicalDate>,
    pub due_date: CanonicalDate,
    pub status: TaskStatus,
    pub priority: Priority,
    /// `None` means the task does not recur.
    pub repeat: Option<RecurrencePeriod>,
    pub notes: Option<String>,
    pub url: Option<String>,
}

/// Caller input for creating a task; identity is assigned by the service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub project_ids: Vec<RecordId>,
    pub title: String,
    pub start_date: Option<CanonicalDate>,
    pub due_date: CanonicalDate,
    pub status: TaskStatus,
    pub priority: Priority,
    pub repeat: Option<RecurrencePeriod>,
    pub notes: Option<String>,
    pub url: Option<String>,
}

impl TaskDraft {
    /// Draft with `not-started` status, `medium` priority and no extras.
    pub fn new(title: impl Into<String>, due_date: CanonicalDate) -> Self {
        Self {
            project_ids: Vec::new(),
            title: title.into(),
            start_date: None,
            due_date,
            status: TaskStatus::NotStarted,
            priority: Priority::Medium,
            repeat: None,
            notes: None,
            url: None,
        }
    }
}

/// Partial update. Outer `None` leaves a field unchanged; for optional
/// fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub project_ids: Option<Vec<RecordId>>,
    pub title: Option<String>,
    pub start_date: Option<Option<CanonicalDate>>,
    pub due_date: Option<CanonicalDate>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub repeat: Option<Option<RecurrencePeriod>>,
    pub notes: Option<Option<String>>,
    pub url: Option<Option<String>>,
}

impl Task {
    /// Materializes a draft under the given identity.
    pub fn from_draft(id: RecordId, draft: TaskDraft) -> Self {
        Self {
            id,
            project_ids: draft.project_ids,
            title: draft.title,
            start_date: draft.start_date,
            due_date: draft.due_date,
            status: draft.status,
            priority: draft.priority,
            repeat: draft.repeat,
            notes: draft.notes,
            url: draft.url,
        }
    }

    /// Applies a partial update in place. Identity is never touched.
    pub fn apply_patch(&mut self, patch: TaskPatch) {
        if let Some(project_ids) = patch.project_ids {
            self.project_ids = project_ids;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(repeat) = patch.repeat {
            self.repeat = repeat;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("task title", &self.title)?;
        require_unique_projects(&self.project_ids)
    }

    pub fn is_recurring(&self) -> bool {
        self.repeat.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{Priority, Task, TaskDraft, TaskPatch, TaskStatus};
    use crate::model::date::CanonicalDate;
    use crate::recurrence::period::RecurrencePeriod;
    use uuid::Uuid;

    fn due() -> CanonicalDate {
        CanonicalDate::parse("2025-03-03").unwrap()
    }

    #[test]
    fn status_names_match_wire_format() {
        for status in [
            TaskStatus::NotStarted,
            TaskStatus::InProgress,
            TaskStatus::Done,
            TaskStatus::Blocked,
        ] {
            assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(Priority::parse("urgent"), None);
    }

    #[test]
    fn patch_can_clear_optional_fields_and_keeps_identity() {
        let mut draft = TaskDraft::new("Submit roster", due());
        draft.repeat = Some(RecurrencePeriod::Weekly);
        draft.notes = Some("bring forms".to_string());
        let id = Uuid::from_u128(1);
        let mut task = Task::from_draft(id, draft);

        task.apply_patch(TaskPatch {
            repeat: Some(None),
            notes: Some(None),
            priority: Some(Priority::High),
            ..TaskPatch::default()
        });

        assert_eq!(task.id, id);
        assert_eq!(task.repeat, None);
        assert_eq!(task.notes, None);
        assert_eq!(task.priority, Priority::High);
        assert_eq!(task.title, "Submit roster");
    }

    #[test]
    fn validate_rejects_blank_title_and_duplicate_projects() {
        let task = Task::from_draft(Uuid::from_u128(1), TaskDraft::new("  ", due()));
        assert!(task.validate().is_err());

        let mut draft = TaskDraft::new("Budget review", due());
        draft.project_ids = vec![Uuid::from_u128(9), Uuid::from_u128(9)];
        let task = Task::from_draft(Uuid::from_u128(2), draft);
        assert!(task.validate().is_err());
    }

    #[test]
    fn serializes_with_camel_case_fields_and_kebab_enums() {
        let mut draft = TaskDraft::new("Hire chair", due());
        draft.repeat = Some(RecurrencePeriod::Biweekly);
        let task = Task::from_draft(Uuid::from_u128(3), draft);
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["dueDate"], "2025-03-03");
        assert_eq!(json["status"], "not-started");
        assert_eq!(json["repeat"], "biweekly");
        assert_eq!(json["projectIds"], serde_json::json!([]));
    }
}
