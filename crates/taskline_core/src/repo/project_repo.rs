//! Project repository contract and SQLite implementation.

use crate::model::ids::RecordId;
use crate::model::project::Project;
use crate::repo::{ensure_tables, parse_record_id, RepoError, RepoResult, NOW_EPOCH_MS_SQL};
use rusqlite::{params, Connection, Row};

const PROJECT_SELECT_SQL: &str = "SELECT uuid, name, slug, color FROM projects";

pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<RecordId>;
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn get_project(&self, id: RecordId) -> RepoResult<Option<Project>>;
    /// Slugs are not unique; the first project by name then id wins.
    fn get_project_by_slug(&self, slug: &str) -> RepoResult<Option<Project>>;
    /// Ordered by name (case-insensitive), then id.
    fn list_projects(&self) -> RepoResult<Vec<Project>>;
}

pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tables(conn, &["projects"])?;
        Ok(Self { conn })
    }

    fn query_one(&self, filter: &str, value: &str) -> RepoResult<Option<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL} WHERE {filter} = ?1
             ORDER BY name COLLATE NOCASE ASC, uuid ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query([value])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_project_row(row)?)),
            None => Ok(None),
        }
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<RecordId> {
        project.validate()?;
        self.conn.execute(
            "INSERT INTO projects (uuid, name, slug, color) VALUES (?1, ?2, ?3, ?4);",
            params![
                project.id.to_string(),
                project.name.as_str(),
                project.slug.as_str(),
                project.color.as_str(),
            ],
        )?;
        Ok(project.id)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;
        let changed = self.conn.execute(
            &format!(
                "UPDATE projects
                 SET name = ?1, slug = ?2, color = ?3, updated_at = {NOW_EPOCH_MS_SQL}
                 WHERE uuid = ?4;"
            ),
            params![
                project.name.as_str(),
                project.slug.as_str(),
                project.color.as_str(),
                project.id.to_string(),
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(project.id));
        }
        Ok(())
    }

    fn get_project(&self, id: RecordId) -> RepoResult<Option<Project>> {
        self.query_one("uuid", &id.to_string())
    }

    fn get_project_by_slug(&self, slug: &str) -> RepoResult<Option<Project>> {
        self.query_one("slug", slug)
    }

    fn list_projects(&self) -> RepoResult<Vec<Project>> {
        let mut stmt = self.conn.prepare(&format!(
            "{PROJECT_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, uuid ASC;"
        ))?;
        let mut rows = stmt.query([])?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }
        Ok(projects)
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let uuid_text: String = row.get("uuid")?;
    let project = Project {
        id: parse_record_id(&uuid_text, "projects.uuid")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        color: row.get("color")?,
    };
    project.validate()?;
    Ok(project)
}
