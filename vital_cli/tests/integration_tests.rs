//! Integration tests for the vital binary.
//!
//! These tests verify end-to-end behavior including:
//! - Service wiring at startup
//! - Theme and settings persistence across runs
//! - Offline log queueing and CSV export

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// CLI bound to `dir` for both data and config, with no key in the environment
fn cli(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vital"));
    cmd.arg("--data-dir")
        .arg(dir.path().join("data"))
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env_remove("VITAL_STORAGE_KEY");
    cmd
}

#[test]
fn test_cli_help() {
    Command::new(assert_cmd::cargo::cargo_bin!("vital"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Personal health tracking and prediction companion",
        ));
}

#[test]
fn test_services_lists_registry() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .arg("services")
        .assert()
        .success()
        .stdout(predicate::str::contains("SecureStorage"))
        .stdout(predicate::str::contains("GetHealthLogsUseCase"))
        .stdout(predicate::str::contains("PredictionRepository"));
}

#[test]
fn test_startup_creates_encrypted_store() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli(&temp_dir)
        .args(["theme", "set", "dark"])
        .assert()
        .success();

    assert!(data_dir.join("storage.key").exists());
    let raw = fs::read_to_string(data_dir.join("secure_store.json")).unwrap();
    assert!(raw.contains("ciphertext"));
    assert!(!raw.contains("theme_mode"));
}

#[test]
fn test_bmi_metric() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["bmi", "--height", "170", "--weight", "70"])
        .assert()
        .success()
        .stdout(predicate::str::contains("BMI: 24.2 (normal)"));
}

#[test]
fn test_bmi_imperial_matches_metric() {
    let temp_dir = setup_test_dir();
    // 5 ft 7 in, 154 lb
    cli(&temp_dir)
        .args([
            "bmi",
            "--height",
            "67",
            "--height-unit",
            "in",
            "--weight",
            "154",
            "--weight-unit",
            "lb",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("BMI: 24.1 (normal)"));
}

#[test]
fn test_bmi_rejects_unknown_unit() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["bmi", "--height", "170", "--height-unit", "furlong", "--weight", "70"])
        .assert()
        .failure();
}

#[test]
fn test_theme_defaults_to_system() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["theme", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mode: system"))
        .stdout(predicate::str::contains("dark: false"));
}

#[test]
fn test_theme_persists_across_runs() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["theme", "set", "dark"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dark: true"));

    cli(&temp_dir)
        .args(["theme", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mode: dark"));
}

#[test]
fn test_theme_toggle_from_system_goes_dark_then_light() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["theme", "toggle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mode: dark"));

    cli(&temp_dir)
        .args(["theme", "toggle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mode: light"));
}

#[test]
fn test_system_signal_ignored_in_explicit_mode() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["theme", "system", "dark"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dark: true"));

    cli(&temp_dir).args(["theme", "set", "light"]).assert().success();

    cli(&temp_dir)
        .args(["theme", "system", "dark"])
        .assert()
        .success()
        .stdout(predicate::str::contains("dark: false"));
}

#[test]
fn test_theme_rejects_unknown_mode() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["theme", "set", "sepia"])
        .assert()
        .failure();
}

#[test]
fn test_settings_partial_update() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["settings", "set", "--share-analytics", "false"])
        .assert()
        .success();

    let output = cli(&temp_dir)
        .args(["settings", "show"])
        .output()
        .expect("Failed to run settings show");
    assert!(output.status.success());

    let settings: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(settings["privacy"]["share_analytics"], false);
    assert_eq!(settings["privacy"]["share_crash_reports"], true);
    assert_eq!(settings["notifications"]["enabled"], true);
    assert_eq!(settings["display"]["language"], "en");
}

#[test]
fn test_settings_reset() {
    let temp_dir = setup_test_dir();

    cli(&temp_dir)
        .args(["settings", "set", "--unit-system", "imperial", "--language", "fr"])
        .assert()
        .success()
        .stdout(predicate::str::contains("imperial"));

    cli(&temp_dir)
        .args(["settings", "reset"])
        .assert()
        .success()
        .stdout(predicate::str::contains("metric"));
}

#[test]
fn test_log_add_list_and_export() {
    let temp_dir = setup_test_dir();
    let csv_path = temp_dir.path().join("logs.csv");

    cli(&temp_dir)
        .args(["log", "add", "--type", "weight", "--value", "70.5"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Queued weight log"));

    cli(&temp_dir)
        .args(["log", "add", "--type", "steps", "--value", "9000", "--notes", "walk"])
        .assert()
        .success();

    cli(&temp_dir)
        .args(["log", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("70.5 kg"))
        .stdout(predicate::str::contains("(walk)"))
        .stdout(predicate::str::contains("2 pending"));

    cli(&temp_dir)
        .args(["log", "export", "--out"])
        .arg(&csv_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported 2 logs"));

    let csv = fs::read_to_string(&csv_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("weight"));
    assert!(lines[2].contains("steps"));
}

#[test]
fn test_log_add_rejects_unknown_type() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["log", "add", "--type", "mood", "--value", "3"])
        .assert()
        .failure();

    cli(&temp_dir)
        .args(["log", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending logs"));
}

#[test]
fn test_sync_with_empty_queue_skips_network() {
    let temp_dir = setup_test_dir();
    cli(&temp_dir)
        .args(["log", "sync"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending logs"));
}
