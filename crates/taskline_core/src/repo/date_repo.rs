//! Date-entry repository contract and SQLite implementation.
//!
//! # Invariants
//! - Replacing an entry deletes the retired row (and its associations) and
//!   inserts the successor in one transaction; the retired id is gone
//!   afterwards.

use crate::model::date_entry::DateEntry;
use crate::model::ids::RecordId;
use crate::repo::{
    ensure_tables, parse_record_id, parse_stored_date, parse_stored_period, ProjectLinks,
    RepoError, RepoResult, NOW_EPOCH_MS_SQL,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const DATE_ENTRY_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    date,
    repeat,
    notes
FROM date_entries";

const DATE_ENTRY_LINKS: ProjectLinks = ProjectLinks {
    table: "date_entry_projects",
    owner_column: "date_entry_uuid",
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateEntryListQuery {
    pub project_id: Option<RecordId>,
}

pub trait DateEntryRepository {
    fn create_date_entry(&self, entry: &DateEntry) -> RepoResult<RecordId>;
    fn update_date_entry(&self, entry: &DateEntry) -> RepoResult<()>;
    fn get_date_entry(&self, id: RecordId) -> RepoResult<Option<DateEntry>>;
    /// Ordered by date, then id.
    fn list_date_entries(&self, query: &DateEntryListQuery) -> RepoResult<Vec<DateEntry>>;
    fn delete_date_entry(&self, id: RecordId) -> RepoResult<()>;
    /// Deletes `retired` and inserts `next`, atomically.
    fn replace_date_entry(&self, retired: RecordId, next: &DateEntry) -> RepoResult<()>;
}

pub struct SqliteDateEntryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteDateEntryRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["date_entries", "date_entry_projects"])?;
        Ok(Self { conn })
    }
}

impl DateEntryRepository for SqliteDateEntryRepository<'_> {
    fn create_date_entry(&self, entry: &DateEntry) -> RepoResult<RecordId> {
        entry.validate()?;
        let tx = self.conn.unchecked_transaction()?;
        insert_date_entry(&tx, entry)?;
        tx.commit()?;
        Ok(entry.id)
    }

    fn update_date_entry(&self, entry: &DateEntry) -> RepoResult<()> {
        entry.validate()?;
        let tx = self.conn.unchecked_transaction()?;
        let changed = tx.execute(
            &format!(
                "UPDATE date_entries
                 SET
                    title = ?1,
                    date = ?2,
                    repeat = ?3,
                    notes = ?4,
                    updated_at = {NOW_EPOCH_MS_SQL}
                 WHERE uuid = ?5;"
            ),
            params![
                entry.title.as_str(),
                entry.date.to_string(),
                entry.repeat.map(|period| period.as_str()),
                entry.notes.as_deref(),
                entry.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(entry.id));
        }
        DATE_ENTRY_LINKS.replace(&tx, entry.id, &entry.project_ids)?;
        tx.commit()?;
        Ok(())
    }

    fn get_date_entry(&self, id: RecordId) -> RepoResult<Option<DateEntry>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DATE_ENTRY_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_date_entry_row(self.conn, row)?)),
            None => Ok(None),
        }
    }

    fn list_date_entries(&self, query: &DateEntryListQuery) -> RepoResult<Vec<DateEntry>> {
        let mut sql = format!("{DATE_ENTRY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(project_id) = query.project_id {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1 FROM date_entry_projects
                    WHERE date_entry_projects.date_entry_uuid = date_entries.uuid
                      AND date_entry_projects.project_uuid = ?
                )",
            );
            bind_values.push(Value::Text(project_id.to_string()));
        }
        sql.push_str(" ORDER BY date ASC, uuid ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next()? {
            entries.push(parse_date_entry_row(self.conn, row)?);
        }
        Ok(entries)
    }

    fn delete_date_entry(&self, id: RecordId) -> RepoResult<()> {
        delete_row(self.conn, id)
    }

    fn replace_date_entry(&self, retired: RecordId, next: &DateEntry) -> RepoResult<()> {
        next.validate()?;
        let tx = self.conn.unchecked_transaction()?;
        delete_row(&tx, retired)?;
        insert_date_entry(&tx, next)?;
        tx.commit()?;
        Ok(())
    }
}

fn insert_date_entry(conn: &Connection, entry: &DateEntry) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO date_entries (uuid, title, date, repeat, notes)
         VALUES (?1, ?2, ?3, ?4, ?5);",
        params![
            entry.id.to_string(),
            entry.title.as_str(),
            entry.date.to_string(),
            entry.repeat.map(|period| period.as_str()),
            entry.notes.as_deref(),
        ],
    )?;
    DATE_ENTRY_LINKS.replace(conn, entry.id, &entry.project_ids)
}

fn delete_row(conn: &Connection, id: RecordId) -> RepoResult<()> {
    let changed = conn.execute(
        "DELETE FROM date_entries WHERE uuid = ?1;",
        [id.to_string()],
    )?;
    if changed == 0 {
        return Err(RepoError::NotFound(id));
    }
    Ok(())
}

fn parse_date_entry_row(conn: &Connection, row: &Row<'_>) -> RepoResult<DateEntry> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_record_id(&uuid_text, "date_entries.uuid")?;
    let date_text: String = row.get("date")?;

    let entry = DateEntry {
        id,
        project_ids: DATE_ENTRY_LINKS.load(conn, id)?,
        title: row.get("title")?,
        date: parse_stored_date(&date_text, "date_entries.date")?,
        repeat: parse_stored_period(row.get("repeat")?, "date_entries.repeat")?,
        notes: row.get("notes")?,
    };
    entry.validate()?;
    Ok(entry)
}
