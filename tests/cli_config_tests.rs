//! End-to-end tests for `filter-presets config` commands.

use serde_json::Value;
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

// ============================================================================
// Show Command Tests
// ============================================================================

#[test]
fn test_config_show_default() {
    let temp_dir = TempDir::new().unwrap();
    let output = isolated_command(&["config", "show"], temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(
        output.status.code(),
        Some(0),
        "Show config should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Data Directory"));
    assert!(stdout.contains("(not configured)"));
}

#[test]
fn test_config_show_json_format() {
    let temp_dir = TempDir::new().unwrap();
    let output = isolated_command(&["config", "show", "--json"], temp_dir.path())
        .output()
        .expect("Failed to execute command");

    assert_eq!(output.status.code(), Some(0));
    let result: Value = serde_json::from_slice(&output.stdout).expect("Should parse JSON output");

    assert_eq!(result["log_level"], "info");
    assert!(result["data_dir"]
        .as_str()
        .unwrap()
        .starts_with(temp_dir.path().to_str().unwrap()));
    assert!(result.get("catalog_file").is_none());
}

#[test]
fn test_config_path_uses_override() {
    let temp_dir = TempDir::new().unwrap();
    let output = isolated_command(&["config", "path"], temp_dir.path())
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.trim().ends_with("config.toml"));
    assert!(stdout.contains(temp_dir.path().to_str().unwrap()));
}

// ============================================================================
// Set Command Tests
// ============================================================================

#[test]
fn test_config_set_log_level() {
    let temp_dir = TempDir::new().unwrap();
    let output = isolated_command(&["config", "set", "log_level", "DEBUG"], temp_dir.path())
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(0));

    let content = std::fs::read_to_string(temp_dir.path().join("config.toml")).unwrap();
    assert!(content.contains("level = \"debug\""), "config: {content}");
}

#[test]
fn test_config_set_invalid_values() {
    let temp_dir = TempDir::new().unwrap();

    let output = isolated_command(&["config", "set", "log_level", "loud"], temp_dir.path())
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(1));

    let output = isolated_command(&["config", "set", "colour", "blue"], temp_dir.path())
        .output()
        .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(1));

    let output = isolated_command(
        &["config", "set", "catalog_file", "/definitely/missing.json"],
        temp_dir.path(),
    )
    .output()
    .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(1));

    assert!(!temp_dir.path().join("config.toml").exists());
}

#[test]
fn test_config_catalog_file_is_used_by_apply() {
    let temp_dir = TempDir::new().unwrap();
    let catalog = write_catalog(temp_dir.path());

    let output = isolated_command(
        &["config", "set", "catalog_file", catalog.to_str().unwrap()],
        temp_dir.path(),
    )
    .output()
    .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(0));

    for args in [
        &["filter", "toggle", "--base-model", "Flux*", "--json"][..],
        &["preset", "create", "--name", "Flux", "--json"][..],
    ] {
        let output = isolated_command(args, temp_dir.path()).output().unwrap();
        assert_eq!(output.status.code(), Some(0));
    }

    let output = isolated_command(&["preset", "apply", "--name", "Flux", "--json"], temp_dir.path())
        .output()
        .unwrap();
    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["filters"]["baseModel"], serde_json::json!(["Flux.1 D"]));
}

#[test]
fn test_context_without_license_filter() {
    let temp_dir = TempDir::new().unwrap();
    let output = isolated_command(
        &["config", "set", "images.license_filter", "false"],
        temp_dir.path(),
    )
    .output()
    .expect("Failed to execute command");
    assert_eq!(output.status.code(), Some(0));

    let output = isolated_command(
        &[
            "--context",
            "images",
            "filter",
            "toggle",
            "--license",
            "commercial",
            "--tag",
            "nature",
            "--json",
        ],
        temp_dir.path(),
    )
    .output()
    .unwrap();
    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["filters"]["license"], serde_json::json!({}));
    assert_eq!(result["filters"]["tags"]["nature"], "include");
}
