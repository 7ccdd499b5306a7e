//! Core logic for taskline: date extraction from free text, recurring
//! task/date bookkeeping and the SQLite record store behind them.
//! This crate is the single source of truth for business invariants.

pub mod config;
pub mod db;
pub mod extract;
pub mod logging;
pub mod model;
pub mod recurrence;
pub mod repo;
pub mod service;
pub mod timeline;

pub use config::Config;
pub use db::{open_db, open_db_in_memory, DbError};
pub use extract::fetch::import_url;
pub use extract::source::{import_document, ImportError, ImportOutcome, SourceFormat};
pub use extract::{extract_dates, normalize_year, ExtractedOccurrence};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::date::{CanonicalDate, DateError};
pub use model::date_entry::{DateEntry, DateEntryDraft, DateEntryPatch};
pub use model::ids::{IdGenerator, RandomIdGenerator, RecordId, SequentialIdGenerator};
pub use model::project::Project;
pub use model::task::{Priority, Task, TaskDraft, TaskPatch, TaskStatus};
pub use recurrence::period::{advance_date, RecurrenceError, RecurrencePeriod};
pub use recurrence::rollover::{DateEntryRollover, RolloverError, TaskRollover};
pub use repo::date_repo::{DateEntryListQuery, DateEntryRepository, SqliteDateEntryRepository};
pub use repo::project_repo::{ProjectRepository, SqliteProjectRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskListQuery, TaskRepository};
pub use repo::{RepoError, RepoResult};
pub use service::date_service::{DateEntryService, DateEntryServiceError};
pub use service::project_service::{ProjectService, ProjectServiceError};
pub use service::task_service::{TaskService, TaskServiceError, TaskUpdate};
pub use timeline::{build_timeline, MonthGroup, Timeline, TimelineItem};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
