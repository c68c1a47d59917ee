use super::*;
use crate::catalog::ProjectStatus;
use crate::state::test_helpers;

fn query(q: Option<&str>, status: Option<&str>) -> Query<ProjectQuery> {
    Query(ProjectQuery { q: q.map(str::to_string), status: status.map(str::to_string) })
}

#[tokio::test]
async fn list_projects_defaults_to_everything() {
    let state = test_helpers::test_app_state();
    let Json(listing) = list_projects(State(state), Query(ProjectQuery::default()))
        .await
        .unwrap();
    assert_eq!(listing.projects.len(), 5);
    assert_eq!(listing.total, 5);
}

#[tokio::test]
async fn list_projects_applies_query_and_status() {
    let state = test_helpers::test_app_state();
    let Json(listing) = list_projects(State(state), query(Some("API"), Some("building")))
        .await
        .unwrap();
    assert_eq!(listing.projects.len(), 1);
    assert_eq!(listing.projects[0].name, "E-commerce API");
    assert_eq!(listing.projects[0].status, ProjectStatus::Building);
    assert_eq!(listing.total, 5);
}

#[tokio::test]
async fn list_projects_no_match_is_empty_not_error() {
    let state = test_helpers::test_app_state();
    let Json(listing) = list_projects(State(state), query(Some("zzz"), Some("all")))
        .await
        .unwrap();
    assert!(listing.projects.is_empty());
}

#[tokio::test]
async fn list_projects_rejects_unknown_status() {
    let state = test_helpers::test_app_state();
    let err = list_projects(State(state), query(None, Some("archived")))
        .await
        .unwrap_err();
    assert_eq!(err, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_and_overview_come_from_catalog() {
    let state = test_helpers::test_app_state();
    let Json(dash) = dashboard(State(state.clone())).await;
    assert_eq!(dash, state.catalog.dashboard);

    let Json(over) = overview(State(state.clone())).await;
    assert_eq!(over.features, state.catalog.features);
}

#[test]
fn filter_error_maps_to_bad_request() {
    let err = FilterError::InvalidStatus("x".into());
    assert_eq!(filter_error_to_status(err), StatusCode::BAD_REQUEST);
}
