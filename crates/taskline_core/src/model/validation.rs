//! Write-path validation shared by record types.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// A record failed validation before persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title (task/date entry) or name (project) is blank after trim.
    BlankField(&'static str),
    /// The same project id appears twice in one association list.
    DuplicateProject(uuid::Uuid),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankField(field) => write!(f, "{field} must not be blank"),
            Self::DuplicateProject(id) => write!(f, "project {id} is listed more than once"),
        }
    }
}

impl Error for ValidationError {}

pub(crate) fn require_non_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::BlankField(field));
    }
    Ok(())
}

pub(crate) fn require_unique_projects(ids: &[uuid::Uuid]) -> Result<(), ValidationError> {
    for (index, id) in ids.iter().enumerate() {
        if ids[..index].contains(id) {
            return Err(ValidationError::DuplicateProject(*id));
        }
    }
    Ok(())
}
