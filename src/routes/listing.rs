//! Static listing routes: landing overview, dashboard, and projects.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::{Dashboard, Feature};
use crate::services::projects::{self, FilterError, ProjectListing, StatusFilter};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProjectQuery {
    pub q: Option<String>,
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct OverviewResponse {
    pub features: Vec<Feature>,
}

/// `GET /api/overview` — landing page features.
pub async fn overview(State(state): State<AppState>) -> Json<OverviewResponse> {
    Json(OverviewResponse { features: state.catalog.features.clone() })
}

/// `GET /api/dashboard` — stats, project summaries, recent activity.
pub async fn dashboard(State(state): State<AppState>) -> Json<Dashboard> {
    Json(state.catalog.dashboard.clone())
}

/// `GET /api/projects?q=&status=` — filtered project list.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<ProjectQuery>,
) -> Result<Json<ProjectListing>, StatusCode> {
    let status = StatusFilter::parse(params.status.as_deref()).map_err(|e| {
        warn!(error = %e, "projects: rejected status filter");
        filter_error_to_status(e)
    })?;
    let query = params.q.unwrap_or_default();

    Ok(Json(projects::list_projects(&state.catalog.projects, &query, status)))
}

pub(crate) fn filter_error_to_status(err: FilterError) -> StatusCode {
    match err {
        FilterError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
    }
}

#[cfg(test)]
#[path = "listing_test.rs"]
mod tests;
