//! Project use-case service.

use crate::model::ids::{IdGenerator, RandomIdGenerator, RecordId};
use crate::model::project::Project;
use crate::repo::project_repo::ProjectRepository;
use crate::repo::RepoError;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ProjectServiceError {
    RecordNotFound(RecordId),
    Repo(RepoError),
}

impl Display for ProjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RecordNotFound(id) => write!(f, "project not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ProjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::RecordNotFound(_) => None,
        }
    }
}

impl From<RepoError> for ProjectServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::RecordNotFound(id),
            other => Self::Repo(other),
        }
    }
}

pub struct ProjectService<R: ProjectRepository, G: IdGenerator = RandomIdGenerator> {
    repo: R,
    ids: G,
}

impl<R: ProjectRepository> ProjectService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_id_generator(repo, RandomIdGenerator)
    }
}

impl<R: ProjectRepository, G: IdGenerator> ProjectService<R, G> {
    pub fn with_id_generator(repo: R, ids: G) -> Self {
        Self { repo, ids }
    }

    /// Creates a project; the slug is derived from `name`.
    pub fn create_project(
        &self,
        name: &str,
        color: &str,
    ) -> Result<Project, ProjectServiceError> {
        let project = Project::new(self.ids.next_id(), name.trim(), color);
        self.repo.create_project(&project)?;
        info!(
            "event=project_create module=service status=ok project_id={}",
            project.id
        );
        Ok(project)
    }

    /// Renames and recolors a project, re-deriving its slug.
    pub fn rename_project(
        &self,
        id: RecordId,
        name: &str,
        color: &str,
    ) -> Result<Project, ProjectServiceError> {
        let mut project = self
            .repo
            .get_project(id)?
            .ok_or(ProjectServiceError::RecordNotFound(id))?;
        project.rename(name.trim(), color);
        self.repo.update_project(&project)?;
        Ok(project)
    }

    pub fn get_project(&self, id: RecordId) -> Result<Option<Project>, ProjectServiceError> {
        Ok(self.repo.get_project(id)?)
    }

    pub fn get_project_by_slug(&self, slug: &str) -> Result<Option<Project>, ProjectServiceError> {
        Ok(self.repo.get_project_by_slug(slug)?)
    }

    pub fn list_projects(&self) -> Result<Vec<Project>, ProjectServiceError> {
        Ok(self.repo.list_projects()?)
    }
}
