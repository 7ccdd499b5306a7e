//! Task repository contract and SQLite implementation.
//!
//! # Invariants
//! - A task row and its project associations are written together.
//! - Recording a rollover updates the completed task and inserts its
//!   successor in one transaction.

use crate::model::ids::RecordId;
use crate::model::task::{Priority, Task, TaskStatus};
use crate::recurrence::rollover::TaskRollover;
use crate::repo::{
    ensure_tables, parse_record_id, parse_stored_date, parse_stored_period, ProjectLinks,
    RepoError, RepoResult, NOW_EPOCH_MS_SQL,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    start_date,
    due_date,
    status,
    priority,
    repeat,
    notes,
    url
FROM tasks";

const TASK_LINKS: ProjectLinks = ProjectLinks {
    table: "task_projects",
    owner_column: "task_uuid",
};

/// Filters for listing tasks. Empty means every task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
    pub project_id: Option<RecordId>,
}

pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<RecordId>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: RecordId) -> RepoResult<Option<Task>>;
    /// Ordered by due date, then id.
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn delete_task(&self, id: RecordId) -> RepoResult<()>;
    /// Persists `rollover.completed` over its existing row and inserts
    /// `rollover.next`, atomically.
    fn record_rollover(&self, rollover: &TaskRollover) -> RepoResult<()>;
}

pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Wraps a connection that has been opened through `open_db`.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["tasks", "task_projects"])?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<RecordId> {
        task.validate()?;
        let tx = self.conn.unchecked_transaction()?;
        insert_task(&tx, task)?;
        tx.commit()?;
        Ok(task.id)
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;
        let tx = self.conn.unchecked_transaction()?;
        overwrite_task(&tx, task)?;
        tx.commit()?;
        Ok(())
    }

    fn get_task(&self, id: RecordId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_task_row(self.conn, row)?)),
            None => Ok(None),
        }
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(status.as_str().to_string()));
        }
        if let Some(project_id) = query.project_id {
            sql.push_str(
                " AND EXISTS (
                    SELECT 1 FROM task_projects
                    WHERE task_projects.task_uuid = tasks.uuid
                      AND task_projects.project_uuid = ?
                )",
            );
            bind_values.push(Value::Text(project_id.to_string()));
        }
        sql.push_str(" ORDER BY due_date ASC, uuid ASC;");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(self.conn, row)?);
        }
        Ok(tasks)
    }

    fn delete_task(&self, id: RecordId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn record_rollover(&self, rollover: &TaskRollover) -> RepoResult<()> {
        rollover.completed.validate()?;
        rollover.next.validate()?;
        let tx = self.conn.unchecked_transaction()?;
        overwrite_task(&tx, &rollover.completed)?;
        insert_task(&tx, &rollover.next)?;
        tx.commit()?;
        Ok(())
    }
}

fn insert_task(conn: &Connection, task: &Task) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO tasks (
            uuid,
            title,
            start_date,
            due_date,
            status,
            priority,
            repeat,
            notes,
            url
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
        params![
            task.id.to_string(),
            task.title.as_str(),
            task.start_date.map(|date| date.to_string()),
            task.due_date.to_string(),
            task.status.as_str(),
            task.priority.as_str(),
            task.repeat.map(|period| period.as_str()),
            task.notes.as_deref(),
            task.url.as_deref(),
        ],
    )?;
    TASK_LINKS.replace(conn, task.id, &task.project_ids)
}

fn overwrite_task(conn: &Connection, task: &Task) -> RepoResult<()> {
    let changed = conn.execute(
        &format!(
            "UPDATE tasks
             SET
                title = ?1,
                start_date = ?2,
                due_date = ?3,
                status = ?4,
                priority = ?5,
                repeat = ?6,
                notes = ?7,
                url = ?8,
                updated_at = {NOW_EPOCH_MS_SQL}
             WHERE uuid = ?9;"
        ),
        params![
            task.title.as_str(),
            task.start_date.map(|date| date.to_string()),
            task.due_date.to_string(),
            task.status.as_str(),
            task.priority.as_str(),
            task.repeat.map(|period| period.as_str()),
            task.notes.as_deref(),
            task.url.as_deref(),
            task.id.to_string(),
        ],
    )?;
    if changed == 0 {
        return Err(RepoError::NotFound(task.id));
    }
    TASK_LINKS.replace(conn, task.id, &task.project_ids)
}

fn parse_task_row(conn: &Connection, row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_record_id(&uuid_text, "tasks.uuid")?;

    let status_text: String = row.get("status")?;
    let status = TaskStatus::parse(&status_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid task status `{status_text}` in tasks.status"))
    })?;
    let priority_text: String = row.get("priority")?;
    let priority = Priority::parse(&priority_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid priority `{priority_text}` in tasks.priority"
        ))
    })?;

    let start_date = match row.get::<_, Option<String>>("start_date")? {
        Some(text) => Some(parse_stored_date(&text, "tasks.start_date")?),
        None => None,
    };
    let due_text: String = row.get("due_date")?;

    let task = Task {
        id,
        project_ids: TASK_LINKS.load(conn, id)?,
        title: row.get("title")?,
        start_date,
        due_date: parse_stored_date(&due_text, "tasks.due_date")?,
        status,
        priority,
        repeat: parse_stored_period(row.get("repeat")?, "tasks.repeat")?,
        notes: row.get("notes")?,
        url: row.get("url")?,
    };
    task.validate()?;
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::{SqliteTaskRepository, TaskListQuery, TaskRepository};
    use crate::db::open_db_in_memory;
    use crate::model::date::CanonicalDate;
    use crate::model::task::{Task, TaskDraft, TaskStatus};
    use crate::repo::RepoError;
    use rusqlite::Connection;
    use uuid::Uuid;

    fn task(id: u128, title: &str, due: &str) -> Task {
        Task::from_draft(
            Uuid::from_u128(id),
            TaskDraft::new(title, CanonicalDate::parse(due).unwrap()),
        )
    }

    #[test]
    fn try_new_rejects_unmigrated_connection() {
        let conn = Connection::open_in_memory().unwrap();
        let result = SqliteTaskRepository::try_new(&conn);
        assert!(matches!(result, Err(RepoError::MissingRequiredTable("tasks"))));
    }

    #[test]
    fn project_order_survives_round_trip() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        let mut record = task(1, "Essay", "2025-04-01");
        record.project_ids = vec![Uuid::from_u128(30), Uuid::from_u128(10), Uuid::from_u128(20)];
        repo.create_task(&record).unwrap();

        let loaded = repo.get_task(record.id).unwrap().unwrap();
        assert_eq!(loaded.project_ids, record.project_ids);
    }

    #[test]
    fn list_orders_by_due_date_then_id_and_filters() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        let project = Uuid::from_u128(99);

        let mut late = task(3, "Late", "2025-05-01");
        late.project_ids = vec![project];
        let mut second = task(2, "Second", "2025-04-01");
        second.status = TaskStatus::Done;
        let first = task(1, "First", "2025-04-01");
        for record in [&late, &second, &first] {
            repo.create_task(record).unwrap();
        }

        let all = repo.list_tasks(&TaskListQuery::default()).unwrap();
        let titles: Vec<&str> = all.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Late"]);

        let done = repo
            .list_tasks(&TaskListQuery {
                status: Some(TaskStatus::Done),
                project_id: None,
            })
            .unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, second.id);

        let in_project = repo
            .list_tasks(&TaskListQuery {
                status: None,
                project_id: Some(project),
            })
            .unwrap();
        assert_eq!(in_project.len(), 1);
        assert_eq!(in_project[0].id, late.id);
    }

    #[test]
    fn corrupted_period_is_reported_as_invalid_data() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        let record = task(1, "Rent", "2025-04-01");
        repo.create_task(&record).unwrap();
        conn.execute_batch("PRAGMA ignore_check_constraints = ON;")
            .unwrap();
        conn.execute(
            "UPDATE tasks SET repeat = 'fortnightly' WHERE uuid = ?1;",
            [record.id.to_string()],
        )
        .unwrap();

        let err = repo.get_task(record.id).unwrap_err();
        assert!(matches!(err, RepoError::InvalidData(_)));
    }

    #[test]
    fn update_and_delete_missing_task_report_not_found() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteTaskRepository::try_new(&conn).unwrap();
        let record = task(5, "Ghost", "2025-01-01");
        assert!(matches!(repo.update_task(&record), Err(RepoError::NotFound(id)) if id == record.id));
        assert!(matches!(repo.delete_task(record.id), Err(RepoError::NotFound(_))));
    }
}
