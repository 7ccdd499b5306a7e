//! Task use-case service.
//!
//! # Responsibility
//! - Create, update, list and delete tasks through a `TaskRepository`.
//! - Complete recurring tasks by rolling them over.
//! - Turn extracted date occurrences into tasks.
//!
//! # Invariants
//! - New identities come only from the injected `IdGenerator`.
//! - A recurring task that moves from any non-done status to `done`
//!   (through `update_task` or `complete_task`) gets exactly one successor;
//!   completing a task that is already `done` is refused.
//! - A failed completion leaves the store unchanged.

use crate::extract::ExtractedOccurrence;
use crate::model::ids::{IdGenerator, RandomIdGenerator, RecordId};
use crate::model::task::{Task, TaskDraft, TaskPatch, TaskStatus};
use crate::recurrence::rollover::{roll_over_task, RolloverError, TaskRollover};
use crate::repo::task_repo::{TaskListQuery, TaskRepository};
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum TaskServiceError {
    RecordNotFound(RecordId),
    /// Completion requested for a task without a recurrence period.
    NoRecurrenceConfigured(RecordId),
    /// Completion requested for a task that is already `done`.
    AlreadyCompleted(RecordId),
    NoNextOccurrence(RecordId),
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecordNotFound(id) => write!(f, "task not found: {id}"),
            Self::NoRecurrenceConfigured(id) => write!(f, "this item does not repeat: {id}"),
            Self::AlreadyCompleted(id) => write!(f, "task is already done: {id}"),
            Self::NoNextOccurrence(id) => {
                write!(f, "next occurrence is past 9999-12-31: {id}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::RecordNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<RolloverError> for TaskServiceError {
    fn from(value: RolloverError) -> Self {
        match value {
            RolloverError::NoRecurrenceConfigured(id) => Self::NoRecurrenceConfigured(id),
            RolloverError::NoNextOccurrence(id) => Self::NoNextOccurrence(id),
        }
    }
}

/// Result of `update_task`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskUpdate {
    pub task: Task,
    /// Successor created when the update completed a recurring task.
    pub spawned: Option<Task>,
}

pub struct TaskService<R: TaskRepository, G: IdGenerator = RandomIdGenerator> {
    repo: R,
    ids: G,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_id_generator(repo, RandomIdGenerator)
    }
}

impl<R: TaskRepository, G: IdGenerator> TaskService<R, G> {
    pub fn with_id_generator(repo: R, ids: G) -> Self {
        Self { repo, ids }
    }

    /// Persists a new task under a fresh id and returns it.
    pub fn create_task(&self, draft: TaskDraft) -> Result<Task, TaskServiceError> {
        let task = Task::from_draft(self.ids.next_id(), draft);
        self.repo.create_task(&task)?;
        info!(
            "event=task_create module=service status=ok task_id={} projects={}",
            task.id,
            task.project_ids.len()
        );
        Ok(task)
    }

    pub fn get_task(&self, id: RecordId) -> Result<Option<Task>, TaskServiceError> {
        Ok(self.repo.get_task(id)?)
    }

    pub fn list_tasks(&self, query: &TaskListQuery) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.repo.list_tasks(query)?)
    }

    /// Applies `patch` to an existing task.
    ///
    /// Moving a recurring task to `done` from another status also appends
    /// its next occurrence in the same transaction.
    pub fn update_task(
        &self,
        id: RecordId,
        patch: TaskPatch,
    ) -> Result<TaskUpdate, TaskServiceError> {
        let current = self.load(id)?;
        let was_done = current.status == TaskStatus::Done;
        let mut patched = current;
        patched.apply_patch(patch);

        if !was_done && patched.status == TaskStatus::Done && patched.is_recurring() {
            let rollover = self.persist_rollover(&patched)?;
            return Ok(TaskUpdate {
                task: rollover.completed,
                spawned: Some(rollover.next),
            });
        }

        self.repo.update_task(&patched)?;
        Ok(TaskUpdate {
            task: patched,
            spawned: None,
        })
    }

    pub fn delete_task(&self, id: RecordId) -> Result<(), TaskServiceError> {
        self.repo.delete_task(id)?;
        info!("event=task_delete module=service status=ok task_id={id}");
        Ok(())
    }

    /// Marks a recurring task done and appends its next occurrence.
    ///
    /// # Errors
    /// - `RecordNotFound` when `id` is unknown.
    /// - `AlreadyCompleted` when the task is already `done`.
    /// - `NoRecurrenceConfigured` when the task does not repeat.
    /// - `NoNextOccurrence` when the next due date would pass `9999-12-31`.
    ///
    /// Nothing is written on error.
    pub fn complete_task(&self, id: RecordId) -> Result<TaskRollover, TaskServiceError> {
        let result = self.load(id).and_then(|task| {
            if task.status == TaskStatus::Done {
                return Err(TaskServiceError::AlreadyCompleted(id));
            }
            self.persist_rollover(&task)
        });
        if let Err(err) = &result {
            warn!(
                "event=task_complete module=service status=error task_id={} error={}",
                id, err
            );
        }
        result
    }

    /// Creates one not-started, medium-priority task per occurrence, due on
    /// the occurrence date and linked to `project_id`.
    pub fn import_occurrences(
        &self,
        occurrences: &[ExtractedOccurrence],
        project_id: RecordId,
    ) -> Result<Vec<Task>, TaskServiceError> {
        let mut created = Vec::with_capacity(occurrences.len());
        for occurrence in occurrences {
            let mut draft = TaskDraft::new(occurrence_title(occurrence), occurrence.date);
            draft.project_ids = vec![project_id];
            created.push(self.create_task(draft)?);
        }
        info!(
            "event=task_import module=service status=ok created={} project_id={}",
            created.len(),
            project_id
        );
        Ok(created)
    }

    fn load(&self, id: RecordId) -> Result<Task, TaskServiceError> {
        self.repo
            .get_task(id)?
            .ok_or(TaskServiceError::RecordNotFound(id))
    }

    fn persist_rollover(&self, task: &Task) -> Result<TaskRollover, TaskServiceError> {
        let rollover = roll_over_task(task, self.ids.next_id())?;
        self.repo.record_rollover(&rollover)?;
        info!(
            "event=task_complete module=service status=ok task_id={} next_task_id={}",
            rollover.completed.id, rollover.next.id
        );
        Ok(rollover)
    }
}

/// Trimmed label, or the canonical date string when the label is blank.
pub(crate) fn occurrence_title(occurrence: &ExtractedOccurrence) -> String {
    let label = occurrence.label.trim();
    if label.is_empty() {
        occurrence.date.to_string()
    } else {
        label.to_string()
    }
}
