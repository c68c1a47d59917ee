//! Catalog — the constant display records behind the listing views.
//!
//! DESIGN
//! ======
//! Every listing (projects, dashboard, landing overview, chat side panel)
//! is served from a `Catalog` handed to `AppState` at construction. The
//! listing logic never knows where the records came from: the built-in
//! demo fixture or a JSON file named by `CATALOG_PATH`.

use std::path::Path;

use serde::{Deserialize, Serialize};

// =============================================================================
// PROJECT
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Active,
    Building,
    Completed,
    Paused,
    Error,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 5] = [Self::Active, Self::Building, Self::Completed, Self::Paused, Self::Error];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Building => "building",
            Self::Completed => "completed",
            Self::Paused => "paused",
            Self::Error => "error",
        }
    }

    /// Exact lowercase match against `as_str`.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }
}

/// Project display record. Timestamps are display strings, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub technologies: Vec<String>,
    pub created_at: String,
    pub last_modified: String,
    pub branch: String,
    pub repository: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployment_url: Option<String>,
    pub team: Vec<String>,
    pub build_time: String,
    pub lines_of_code: u32,
}

// =============================================================================
// DASHBOARD
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildPhase {
    Planning,
    Building,
    Completed,
}

/// Compact project card shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub description: String,
    pub phase: BuildPhase,
    /// Percent, 0..=100.
    pub progress: u8,
    pub last_activity: String,
    pub tech: Vec<String>,
    pub branch: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Git,
    Build,
    Database,
    Deploy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub action: String,
    pub project: String,
    pub time: String,
    pub kind: ActivityKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dashboard {
    pub stats: Vec<Stat>,
    pub projects: Vec<ProjectSummary>,
    pub activities: Vec<Activity>,
}

// =============================================================================
// LANDING + CHAT SIDE PANEL
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    pub title: String,
    pub description: String,
}

/// Project pinned in the chat side panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveProject {
    pub name: String,
    pub stack: String,
    pub tags: Vec<String>,
}

// =============================================================================
// CATALOG
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog read failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog parse failed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("dashboard project {id} has progress {progress}, expected 0..=100")]
    ProgressOutOfRange { id: String, progress: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub projects: Vec<Project>,
    #[serde(default)]
    pub dashboard: Dashboard,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub active_project: Option<ActiveProject>,
    #[serde(default)]
    pub templates: Vec<String>,
}

impl Catalog {
    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a valid catalog,
    /// or holds a dashboard progress above 100.
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let catalog: Self = serde_json::from_str(&raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        match self.dashboard.projects.iter().find(|p| p.progress > 100) {
            Some(p) => Err(CatalogError::ProgressOutOfRange { id: p.id.clone(), progress: p.progress }),
            None => Ok(()),
        }
    }

    /// Built-in fixture shown by the demo.
    #[must_use]
    pub fn demo() -> Self {
        Self {
            projects: demo_projects(),
            dashboard: demo_dashboard(),
            features: vec![
                feature("Chat-Driven Development", "Design and implement backend APIs in natural language"),
                feature("Supabase Integration", "Automatic provisioning and migrations"),
                feature("GitHub Workflow", "Fully automated from PR creation to review"),
                feature("Python & Jupyter", "Run data processing and analysis code in the browser"),
            ],
            active_project: Some(ActiveProject {
                name: "E-commerce API".into(),
                stack: "FastAPI + Supabase".into(),
                tags: strings(&["Python", "FastAPI"]),
            }),
            templates: strings(&[
                "REST API with Authentication",
                "GraphQL API with Subscriptions",
                "Microservices Architecture",
                "Real-time Chat Backend",
            ]),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn feature(title: &str, description: &str) -> Feature {
    Feature { title: title.into(), description: description.into() }
}

fn stat(label: &str, value: &str) -> Stat {
    Stat { label: label.into(), value: value.into() }
}

fn activity(action: &str, project: &str, time: &str, kind: ActivityKind) -> Activity {
    Activity { action: action.into(), project: project.into(), time: time.into(), kind }
}

fn demo_projects() -> Vec<Project> {
    vec![
        Project {
            id: "1".into(),
            name: "E-commerce API".into(),
            description: "FastAPI backend with Supabase integration for online marketplace".into(),
            status: ProjectStatus::Building,
            technologies: strings(&["Python", "FastAPI", "Supabase", "Redis", "Docker"]),
            created_at: "2024-01-15".into(),
            last_modified: "2 minutes ago".into(),
            branch: "feature/payment-integration".into(),
            repository: "github.com/team/ecommerce-api".into(),
            deployment_url: Some("https://api.marketplace.dev".into()),
            team: strings(&["Alice", "Bob", "Carol"]),
            build_time: "45s".into(),
            lines_of_code: 2840,
        },
        Project {
            id: "2".into(),
            name: "Chat Bot Service".into(),
            description: "Claude-powered customer support automation with multi-language support".into(),
            status: ProjectStatus::Completed,
            technologies: strings(&["Node.js", "Claude API", "Express", "MongoDB", "Socket.io"]),
            created_at: "2024-01-10".into(),
            last_modified: "1 hour ago".into(),
            branch: "main".into(),
            repository: "github.com/team/chatbot-service".into(),
            deployment_url: Some("https://chat.support.app".into()),
            team: strings(&["David", "Eve"]),
            build_time: "32s".into(),
            lines_of_code: 1965,
        },
        Project {
            id: "3".into(),
            name: "Analytics Dashboard API".into(),
            description: "Real-time data processing and visualization backend".into(),
            status: ProjectStatus::Active,
            technologies: strings(&["Python", "Django", "PostgreSQL", "Celery", "WebSocket"]),
            created_at: "2024-01-05".into(),
            last_modified: "3 hours ago".into(),
            branch: "develop".into(),
            repository: "github.com/team/analytics-api".into(),
            deployment_url: Some("https://analytics.dashboard.io".into()),
            team: strings(&["Frank", "Grace", "Henry"]),
            build_time: "1m 23s".into(),
            lines_of_code: 4532,
        },
        Project {
            id: "4".into(),
            name: "Authentication Service".into(),
            description: "OAuth2 and JWT-based microservice for user management".into(),
            status: ProjectStatus::Paused,
            technologies: strings(&["Go", "Gin", "PostgreSQL", "JWT", "Redis"]),
            created_at: "2024-01-01".into(),
            last_modified: "2 days ago".into(),
            branch: "feature/oauth-providers".into(),
            repository: "github.com/team/auth-service".into(),
            deployment_url: None,
            team: strings(&["Ian", "Jane"]),
            build_time: "28s".into(),
            lines_of_code: 1234,
        },
        Project {
            id: "5".into(),
            name: "File Storage API".into(),
            description: "Distributed file storage with CDN integration".into(),
            status: ProjectStatus::Error,
            technologies: strings(&["Rust", "Actix", "AWS S3", "Redis", "Docker"]),
            created_at: "2023-12-28".into(),
            last_modified: "4 days ago".into(),
            branch: "hotfix/s3-connection".into(),
            repository: "github.com/team/storage-api".into(),
            deployment_url: None,
            team: strings(&["Kevin"]),
            build_time: "Failed".into(),
            lines_of_code: 892,
        },
    ]
}

fn demo_dashboard() -> Dashboard {
    Dashboard {
        stats: vec![
            stat("Active Projects", "3"),
            stat("Successful Builds", "127"),
            stat("GitHub PRs", "24"),
            stat("Team Members", "8"),
        ],
        projects: vec![
            ProjectSummary {
                id: "1".into(),
                name: "E-commerce API".into(),
                description: "FastAPI backend with Supabase integration".into(),
                phase: BuildPhase::Building,
                progress: 75,
                last_activity: "2 minutes ago".into(),
                tech: strings(&["Python", "FastAPI", "Supabase"]),
                branch: "feature/payment-integration".into(),
            },
            ProjectSummary {
                id: "2".into(),
                name: "Chat Bot Service".into(),
                description: "Claude-powered customer support bot".into(),
                phase: BuildPhase::Completed,
                progress: 100,
                last_activity: "1 hour ago".into(),
                tech: strings(&["Node.js", "Claude API", "Express"]),
                branch: "main".into(),
            },
            ProjectSummary {
                id: "3".into(),
                name: "Analytics Dashboard".into(),
                description: "Real-time data visualization platform".into(),
                phase: BuildPhase::Planning,
                progress: 25,
                last_activity: "1 day ago".into(),
                tech: strings(&["React", "D3.js", "WebSocket"]),
                branch: "develop".into(),
            },
        ],
        activities: vec![
            activity("PR Created", "E-commerce API", "2m ago", ActivityKind::Git),
            activity("Build Completed", "Chat Bot Service", "5m ago", ActivityKind::Build),
            activity("Database Migration", "E-commerce API", "15m ago", ActivityKind::Database),
            activity("Function Deployed", "Analytics Dashboard", "1h ago", ActivityKind::Deploy),
        ],
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
