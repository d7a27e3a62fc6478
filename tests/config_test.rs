//! Integration tests for layered Settings loading
//!
//! Layers: defaults → global file → explicit file → TREECTL_* env.
//! These tests only use temp files and leave the environment alone.

use std::fs;

use tempfile::TempDir;

use treectl::application::ApplicationError;
use treectl::config::{Settings, DEFAULT_TIMEOUT_SECS};

#[test]
fn given_global_and_explicit_files_when_loading_then_explicit_wins_per_field() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let global = temp.path().join("global.toml");
    let local = temp.path().join("local.toml");
    fs::write(
        &global,
        r#"
api_url = "http://global.example.com"
timeout_secs = 10

[layout]
horizontal_spacing = 300.0
"#,
    )
    .unwrap();
    fs::write(
        &local,
        r#"
api_url = "http://local.example.com/api/"
"#,
    )
    .unwrap();

    // Act
    let settings = Settings::load_layers(Some(&global), Some(&local)).expect("load");

    // Assert
    assert_eq!(settings.api_url, "http://local.example.com");
    assert_eq!(settings.timeout_secs, 10);
    assert_eq!(settings.layout.horizontal_spacing, 300.0);
    assert_eq!(settings.layout.vertical_spacing, 160.0);
}

#[test]
fn given_missing_global_file_when_loading_then_defaults() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.toml");

    let settings = Settings::load_layers(Some(&missing), None).expect("load");

    assert_eq!(settings.timeout_secs, DEFAULT_TIMEOUT_SECS);
}

#[test]
fn given_missing_explicit_file_when_loading_then_config_error() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.toml");

    let result = Settings::load_layers(None, Some(&missing));

    assert!(matches!(result, Err(ApplicationError::Config { .. })));
}

#[test]
fn given_invalid_toml_when_loading_then_config_error_names_file() {
    let temp = TempDir::new().unwrap();
    let bad = temp.path().join("bad.toml");
    fs::write(&bad, "api_url = [").unwrap();

    let err = Settings::load_layers(None, Some(&bad)).unwrap_err();

    assert!(err.to_string().contains("bad.toml"), "{}", err);
}

#[test]
fn given_zero_spacing_when_loading_then_rejected() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("c.toml");
    fs::write(&file, "[layout]\nvertical_spacing = 0.0\n").unwrap();

    assert!(matches!(
        Settings::load_layers(None, Some(&file)),
        Err(ApplicationError::Config { .. })
    ));
}

#[test]
fn given_session_file_with_tilde_when_loading_then_expanded() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("c.toml");
    fs::write(&file, "session_file = \"~/treectl-test/session.json\"\n").unwrap();

    let settings = Settings::load_layers(None, Some(&file)).expect("load");

    assert!(!settings.session_file.to_string_lossy().starts_with('~'));
}

#[test]
fn given_settings_when_rendering_toml_then_reloads_identically() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("c.toml");
    let settings = Settings::load_layers(None, None).expect("load");

    fs::write(&file, settings.to_toml().unwrap()).unwrap();
    let reloaded = Settings::load_layers(None, Some(&file)).expect("reload");

    assert_eq!(reloaded, settings);
}
