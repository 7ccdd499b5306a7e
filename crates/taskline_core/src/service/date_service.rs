//! Date-entry use-case service.
//!
//! # Invariants
//! - Completing a recurring entry leaves no record under the old id and
//!   exactly one record under a new id.
//! - A failed completion leaves the store unchanged.

use crate::extract::ExtractedOccurrence;
use crate::model::date_entry::{DateEntry, DateEntryDraft, DateEntryPatch};
use crate::model::ids::{IdGenerator, RandomIdGenerator, RecordId};
use crate::recurrence::rollover::{roll_over_date_entry, DateEntryRollover, RolloverError};
use crate::repo::date_repo::{DateEntryListQuery, DateEntryRepository};
use crate::repo::RepoError;
use crate::service::task_service::occurrence_title;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum DateEntryServiceError {
    RecordNotFound(RecordId),
    NoRecurrenceConfigured(RecordId),
    NoNextOccurrence(RecordId),
    Repo(RepoError),
}

impl Display for DateEntryServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecordNotFound(id) => write!(f, "date entry not found: {id}"),
            Self::NoRecurrenceConfigured(id) => write!(f, "this item does not repeat: {id}"),
            Self::NoNextOccurrence(id) => {
                write!(f, "next occurrence is past 9999-12-31: {id}")
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DateEntryServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for DateEntryServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::RecordNotFound(id),
            other => Self::Repo(other),
        }
    }
}

impl From<RolloverError> for DateEntryServiceError {
    fn from(value: RolloverError) -> Self {
        match value {
            RolloverError::NoRecurrenceConfigured(id) => Self::NoRecurrenceConfigured(id),
            RolloverError::NoNextOccurrence(id) => Self::NoNextOccurrence(id),
        }
    }
}

pub struct DateEntryService<R: DateEntryRepository, G: IdGenerator = RandomIdGenerator> {
    repo: R,
    ids: G,
}

impl<R: DateEntryRepository> DateEntryService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_id_generator(repo, RandomIdGenerator)
    }
}

impl<R: DateEntryRepository, G: IdGenerator> DateEntryService<R, G> {
    pub fn with_id_generator(repo: R, ids: G) -> Self {
        Self { repo, ids }
    }

    pub fn create_date_entry(
        &self,
        draft: DateEntryDraft,
    ) -> Result<DateEntry, DateEntryServiceError> {
        let entry = DateEntry::from_draft(self.ids.next_id(), draft);
        self.repo.create_date_entry(&entry)?;
        info!(
            "event=date_create module=service status=ok date_id={}",
            entry.id
        );
        Ok(entry)
    }

    pub fn get_date_entry(&self, id: RecordId) -> Result<Option<DateEntry>, DateEntryServiceError> {
        Ok(self.repo.get_date_entry(id)?)
    }

    pub fn list_date_entries(
        &self,
        query: &DateEntryListQuery,
    ) -> Result<Vec<DateEntry>, DateEntryServiceError> {
        Ok(self.repo.list_date_entries(query)?)
    }

    pub fn update_date_entry(
        &self,
        id: RecordId,
        patch: DateEntryPatch,
    ) -> Result<DateEntry, DateEntryServiceError> {
        let mut entry = self
            .repo
            .get_date_entry(id)?
            .ok_or(DateEntryServiceError::RecordNotFound(id))?;
        entry.apply_patch(patch);
        self.repo.update_date_entry(&entry)?;
        Ok(entry)
    }

    pub fn delete_date_entry(&self, id: RecordId) -> Result<(), DateEntryServiceError> {
        self.repo.delete_date_entry(id)?;
        info!("event=date_delete module=service status=ok date_id={id}");
        Ok(())
    }

    /// Replaces a recurring entry with its next occurrence.
    ///
    /// The returned rollover's `next.id` is the entry's new identity.
    pub fn complete_date_entry(
        &self,
        id: RecordId,
    ) -> Result<DateEntryRollover, DateEntryServiceError> {
        let result = self.roll_over(id);
        match &result {
            Ok(rollover) => info!(
                "event=date_complete module=service status=ok date_id={} next_date_id={}",
                rollover.retired, rollover.next.id
            ),
            Err(err) => warn!(
                "event=date_complete module=service status=error date_id={} error={}",
                id, err
            ),
        }
        result
    }

    /// Creates one date entry per occurrence, optionally linked to a project.
    pub fn import_occurrences(
        &self,
        occurrences: &[ExtractedOccurrence],
        project_id: Option<RecordId>,
    ) -> Result<Vec<DateEntry>, DateEntryServiceError> {
        let mut created = Vec::with_capacity(occurrences.len());
        for occurrence in occurrences {
            let mut draft = DateEntryDraft::new(occurrence_title(occurrence), occurrence.date);
            draft.project_ids = project_id.into_iter().collect();
            created.push(self.create_date_entry(draft)?);
        }
        info!(
            "event=date_import module=service status=ok created={}",
            created.len()
        );
        Ok(created)
    }

    fn roll_over(&self, id: RecordId) -> Result<DateEntryRollover, DateEntryServiceError> {
        let entry = self
            .repo
            .get_date_entry(id)?
            .ok_or(DateEntryServiceError::RecordNotFound(id))?;
        let rollover = roll_over_date_entry(&entry, self.ids.next_id())?;
        self.repo.replace_date_entry(rollover.retired, &rollover.next)?;
        Ok(rollover)
    }
}
