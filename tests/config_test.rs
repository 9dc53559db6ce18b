//! Integration tests for layered settings loading.
//!
//! Precedence: defaults, then global file, then local `.entitree.toml`,
//! then `ENTITREE_*` environment variables. These tests only use temp
//! directories and assume no `ENTITREE_*` variables are set.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use entitree::application::ApplicationError;
use entitree::config::{local_config_path, Settings};

#[test]
fn given_global_and_local_files_when_loading_then_local_wins_per_field() {
    // Arrange
    let global_dir = TempDir::new().unwrap();
    let global_path = global_dir.path().join("entitree.toml");
    fs::write(
        &global_path,
        r#"
data_file = "/srv/treasury/global.json"
include_samples = false
seed_file = "/srv/treasury/seed.json"
"#,
    )
    .unwrap();

    let local_dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(local_dir.path()),
        r#"data_file = "/srv/treasury/local.json""#,
    )
    .unwrap();

    // Act
    let settings = Settings::load_from(Some(&global_path), Some(local_dir.path())).unwrap();

    // Assert
    assert_eq!(settings.data_file, PathBuf::from("/srv/treasury/local.json"));
    assert!(!settings.include_samples);
    assert_eq!(
        settings.seed_file,
        Some(PathBuf::from("/srv/treasury/seed.json"))
    );
}

#[test]
fn given_missing_files_when_loading_then_defaults_apply() {
    let dir = TempDir::new().unwrap();

    let settings =
        Settings::load_from(Some(&dir.path().join("absent.toml")), Some(dir.path())).unwrap();

    assert!(settings.include_samples);
    assert_eq!(settings.seed_file, None);
    assert!(settings.data_file.ends_with("entities.json"));
}

#[test]
fn given_tilde_in_local_file_when_loading_then_path_expanded() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"data_file = "~/books/entities.json""#,
    )
    .unwrap();

    let settings = Settings::load_from(None, Some(dir.path())).unwrap();

    let home = std::env::var("HOME").unwrap();
    assert_eq!(
        settings.data_file,
        PathBuf::from(home).join("books/entities.json")
    );
}

#[test]
fn given_malformed_local_file_when_loading_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "include_samples = \"maybe\"").unwrap();

    let result = Settings::load_from(None, Some(dir.path()));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_loaded_settings_when_rendered_as_toml_then_reparses_identically() {
    let settings = Settings {
        data_file: PathBuf::from("/srv/treasury/entities.json"),
        include_samples: false,
        seed_file: None,
    };

    let rendered = settings.to_toml().unwrap();
    let reparsed: Settings = toml::from_str(&rendered).unwrap();

    assert_eq!(reparsed, settings);
}
