use std::fs;

use colony_core::{ColonyConfig, ColonyError};

#[test]
fn load_reads_yaml_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("colony.yaml");
    fs::write(
        &path,
        "version: \"1\"\nplanner:\n  placements_per_pass: 2\nmovement:\n  max_request_age: 40\n",
    )
    .unwrap();

    let config = ColonyConfig::load(&path).unwrap();
    assert_eq!(config.version.as_deref(), Some("1"));
    assert_eq!(config.planner.placements_per_pass, 2);
    assert_eq!(config.planner.plan_interval, 100);
    assert_eq!(config.movement.max_request_age, 40);
}

#[test]
fn load_or_default_tolerates_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = ColonyConfig::load_or_default(&dir.path().join("absent.yaml")).unwrap();
    assert_eq!(config, ColonyConfig::default());
}

#[test]
fn invalid_yaml_reports_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "scheduler: [this is not a map").unwrap();

    let err = ColonyConfig::load(&path).unwrap_err();
    assert!(matches!(err, ColonyError::Config { .. }));
    assert!(err.to_string().contains("broken.yaml"));
}
