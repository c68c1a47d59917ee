use std::collections::HashSet;
use std::io::Write;

use super::*;

// =============================================================================
// ProjectStatus
// =============================================================================

#[test]
fn project_status_round_trips_through_str() {
    for status in ProjectStatus::ALL {
        assert_eq!(ProjectStatus::parse(status.as_str()), Some(status));
    }
}

#[test]
fn project_status_rejects_unknown_and_mixed_case() {
    assert_eq!(ProjectStatus::parse("all"), None);
    assert_eq!(ProjectStatus::parse("Active"), None);
    assert_eq!(ProjectStatus::parse(""), None);
}

#[test]
fn project_status_serializes_lowercase() {
    let json = serde_json::to_string(&ProjectStatus::Paused).unwrap();
    assert_eq!(json, "\"paused\"");
}

// =============================================================================
// demo fixture
// =============================================================================

#[test]
fn demo_projects_have_unique_ids() {
    let catalog = Catalog::demo();
    let ids: HashSet<&str> = catalog.projects.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids.len(), catalog.projects.len());
}

#[test]
fn demo_covers_every_project_status() {
    let catalog = Catalog::demo();
    for status in ProjectStatus::ALL {
        assert!(
            catalog.projects.iter().any(|p| p.status == status),
            "no demo project with status {}",
            status.as_str()
        );
    }
}

#[test]
fn demo_dashboard_progress_in_range() {
    let catalog = Catalog::demo();
    assert!(!catalog.dashboard.projects.is_empty());
    assert!(catalog.dashboard.projects.iter().all(|p| p.progress <= 100));
    assert_eq!(catalog.dashboard.stats.len(), 4);
    assert_eq!(catalog.dashboard.activities.len(), 4);
}

#[test]
fn undeployed_projects_omit_deployment_url() {
    let catalog = Catalog::demo();
    let paused = catalog
        .projects
        .iter()
        .find(|p| p.status == ProjectStatus::Paused)
        .unwrap();
    let value = serde_json::to_value(paused).unwrap();
    assert!(value.get("deployment_url").is_none());
}

// =============================================================================
// from_json_file
// =============================================================================

fn temp_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("builderdesk-{}-{name}", uuid::Uuid::new_v4()))
}

#[test]
fn from_json_file_loads_demo_round_trip() {
    let path = temp_path("catalog.json");
    let demo = Catalog::demo();
    std::fs::write(&path, serde_json::to_string(&demo).unwrap()).unwrap();

    let loaded = Catalog::from_json_file(&path).unwrap();
    assert_eq!(loaded, demo);

    let _ = std::fs::remove_file(path);
}

#[test]
fn from_json_file_defaults_optional_sections() {
    let path = temp_path("minimal.json");
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(br#"{"projects":[]}"#).unwrap();

    let loaded = Catalog::from_json_file(&path).unwrap();
    assert!(loaded.projects.is_empty());
    assert!(loaded.features.is_empty());
    assert!(loaded.active_project.is_none());
    assert_eq!(loaded.dashboard, Dashboard::default());

    let _ = std::fs::remove_file(path);
}

#[test]
fn from_json_file_missing_is_io_error() {
    let err = Catalog::from_json_file(&temp_path("absent.json")).unwrap_err();
    assert!(matches!(err, CatalogError::Io(_)));
}

#[test]
fn from_json_file_garbage_is_parse_error() {
    let path = temp_path("garbage.json");
    std::fs::write(&path, "not json").unwrap();

    let err = Catalog::from_json_file(&path).unwrap_err();
    assert!(matches!(err, CatalogError::Parse(_)));

    let _ = std::fs::remove_file(path);
}

#[test]
fn from_json_file_rejects_progress_above_hundred() {
    let mut catalog = Catalog::demo();
    catalog.dashboard.projects[0].progress = 101;
    let path = temp_path("progress.json");
    std::fs::write(&path, serde_json::to_string(&catalog).unwrap()).unwrap();

    let err = Catalog::from_json_file(&path).unwrap_err();
    assert!(matches!(err, CatalogError::ProgressOutOfRange { progress: 101, .. }));

    let _ = std::fs::remove_file(path);
}

#[test]
fn from_json_file_accepts_progress_bounds() {
    let mut catalog = Catalog::demo();
    catalog.dashboard.projects[0].progress = 0;
    catalog.dashboard.projects[1].progress = 100;
    let path = temp_path("bounds.json");
    std::fs::write(&path, serde_json::to_string(&catalog).unwrap()).unwrap();

    assert_eq!(Catalog::from_json_file(&path).unwrap(), catalog);

    let _ = std::fs::remove_file(path);
}
