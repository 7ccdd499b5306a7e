//! Project domain model.
//!
//! # Invariants
//! - `slug` is always derived from `name` via [`slugify`]; callers never
//!   set it directly.

use crate::model::ids::RecordId;
use crate::model::validation::{require_non_blank, ValidationError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: RecordId,
    pub name: String,
    pub slug: String,
    /// Display color, stored verbatim (typically `#rrggbb`).
    pub color: String,
}

impl Project {
    pub fn new(id: RecordId, name: impl Into<String>, color: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id,
            slug: slugify(&name),
            name,
            color: color.into(),
        }
    }

    /// Renames/recolors the project and re-derives the slug.
    pub fn rename(&mut self, name: impl Into<String>, color: impl Into<String>) {
        self.name = name.into();
        self.slug = slugify(&self.name);
        self.color = color.into();
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_blank("project name", &self.name)
    }
}

/// Lowercases `name`, collapses every run of characters outside `[a-z0-9]`
/// into one `-`, and trims dashes from both ends.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch);
        } else {
            pending_dash = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::{slugify, Project};
    use uuid::Uuid;

    #[test]
    fn slugify_collapses_and_trims_separators() {
        assert_eq!(slugify("Major and Minor Advising"), "major-and-minor-advising");
        assert_eq!(slugify("  --Budget: FY25!! "), "budget-fy25");
        assert_eq!(slugify("Café Night"), "caf-night");
        assert_eq!(slugify("***"), "");
    }

    #[test]
    fn rename_rederives_slug() {
        let mut project = Project::new(Uuid::from_u128(1), "Faculty Hiring", "#f97316");
        assert_eq!(project.slug, "faculty-hiring");
        project.rename("Faculty Search", "#000000");
        assert_eq!(project.slug, "faculty-search");
        assert_eq!(project.color, "#000000");
    }
}
