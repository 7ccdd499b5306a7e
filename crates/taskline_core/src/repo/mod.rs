//! Repository contracts and SQLite persistence.
//!
//! # Responsibility
//! - Define one data-access contract per aggregate (tasks, date entries,
//!   projects).
//! - Keep SQL and row decoding inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths run `validate()` before any SQL mutation.
//! - Read paths reject invalid persisted state instead of masking it.
//! - Multi-row changes commit in one transaction or not at all.

use crate::db::DbError;
use crate::model::date::CanonicalDate;
use crate::model::ids::RecordId;
use crate::model::validation::ValidationError;
use crate::recurrence::period::RecurrencePeriod;
use rusqlite::{params, Connection};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub mod date_repo;
pub mod project_repo;
pub mod task_repo;

/// SQL expression for the current time in epoch milliseconds.
pub(crate) const NOW_EPOCH_MS_SQL: &str = "(CAST(strftime('%s', 'now') AS INTEGER) * 1000)";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error shared by all repositories.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    NotFound(RecordId),
    InvalidData(String),
    MissingRequiredTable(&'static str),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "record not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "database is missing required table `{table}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidData(_) | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Fails unless every table in `tables` exists, i.e. the connection came
/// through `open_db`.
pub(crate) fn ensure_tables(conn: &Connection, tables: &[&'static str]) -> RepoResult<()> {
    for &table in tables {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
            );",
            [table],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(RepoError::MissingRequiredTable(table));
        }
    }
    Ok(())
}

pub(crate) fn parse_record_id(value: &str, column: &str) -> RepoResult<RecordId> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn parse_stored_date(value: &str, column: &str) -> RepoResult<CanonicalDate> {
    CanonicalDate::parse(value)
        .map_err(|err| RepoError::InvalidData(format!("{err} in {column}")))
}

pub(crate) fn parse_stored_period(
    value: Option<String>,
    column: &str,
) -> RepoResult<Option<RecurrencePeriod>> {
    value
        .map(|text| {
            text.parse::<RecurrencePeriod>()
                .map_err(|err| RepoError::InvalidData(format!("{err} in {column}")))
        })
        .transpose()
}

/// Association tables: `(table, owner column)`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ProjectLinks {
    pub table: &'static str,
    pub owner_column: &'static str,
}

impl ProjectLinks {
    /// Project ids for `owner` in insertion order.
    pub fn load(self, conn: &Connection, owner: RecordId) -> RepoResult<Vec<RecordId>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT project_uuid FROM {} WHERE {} = ?1 ORDER BY position ASC;",
            self.table, self.owner_column
        ))?;
        let mut rows = stmt.query([owner.to_string()])?;
        let mut ids = Vec::new();
        while let Some(row) = rows.next()? {
            let text: String = row.get(0)?;
            ids.push(parse_record_id(&text, self.table)?);
        }
        Ok(ids)
    }

    /// Replaces every association of `owner`. Caller owns the transaction.
    pub fn replace(self, conn: &Connection, owner: RecordId, ids: &[RecordId]) -> RepoResult<()> {
        let owner_text = owner.to_string();
        conn.execute(
            &format!("DELETE FROM {} WHERE {} = ?1;", self.table, self.owner_column),
            [owner_text.as_str()],
        )?;
        let insert_sql = format!(
            "INSERT INTO {} ({}, project_uuid, position) VALUES (?1, ?2, ?3);",
            self.table, self.owner_column
        );
        for (position, project_id) in ids.iter().enumerate() {
            conn.execute(
                &insert_sql,
                params![owner_text.as_str(), project_id.to_string(), position as i64],
            )?;
        }
        Ok(())
    }
}
