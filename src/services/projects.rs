//! Project listing — text and status filtering over the catalog.
//!
//! The filter is a pure function of the constant project list: a
//! case-insensitive substring match on name or description, combined with
//! an exact status match unless the filter is `all`. Order is preserved.

use serde::Serialize;

use crate::catalog::{Project, ProjectStatus};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("unknown status filter: {0}")]
    InvalidStatus(String),
}

impl crate::frame::ErrorCode for FilterError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidStatus(_) => "E_INVALID_STATUS",
        }
    }
}

/// Status half of the filter: everything, or one exact status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ProjectStatus),
}

impl StatusFilter {
    /// Parse `all` or a project status. Absent or blank means `all`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidStatus` for any other value.
    pub fn parse(raw: Option<&str>) -> Result<Self, FilterError> {
        let raw = raw.map(str::trim).unwrap_or_default();
        if raw.is_empty() || raw == "all" {
            return Ok(Self::All);
        }
        ProjectStatus::parse(raw)
            .map(Self::Only)
            .ok_or_else(|| FilterError::InvalidStatus(raw.to_string()))
    }

    #[must_use]
    pub fn matches(self, status: ProjectStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

/// Filtered listing plus the size of the unfiltered list.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectListing {
    pub projects: Vec<Project>,
    pub total: usize,
}

/// True when `query` appears in the project's name or description,
/// ignoring case. An empty query matches everything.
#[must_use]
pub fn matches_query(project: &Project, query: &str) -> bool {
    let needle = query.to_lowercase();
    project.name.to_lowercase().contains(&needle) || project.description.to_lowercase().contains(&needle)
}

/// Projects satisfying both predicates, in catalog order.
#[must_use]
pub fn filter_projects<'a>(projects: &'a [Project], query: &str, status: StatusFilter) -> Vec<&'a Project> {
    projects
        .iter()
        .filter(|p| matches_query(p, query) && status.matches(p.status))
        .collect()
}

/// Owned listing for transport.
#[must_use]
pub fn list_projects(projects: &[Project], query: &str, status: StatusFilter) -> ProjectListing {
    ProjectListing {
        projects: filter_projects(projects, query, status)
            .into_iter()
            .cloned()
            .collect(),
        total: projects.len(),
    }
}

#[cfg(test)]
#[path = "projects_test.rs"]
mod tests;
