//! Corruption recovery tests for the vital binary.
//!
//! These tests verify the system can handle:
//! - A corrupted or truncated encrypted store
//! - A store encrypted under a different key
//! - A malformed config file

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

fn cli(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vital"));
    cmd.arg("--data-dir")
        .arg(dir.path().join("data"))
        .env("XDG_CONFIG_HOME", dir.path().join("config"))
        .env_remove("VITAL_STORAGE_KEY");
    cmd
}

#[test]
fn test_garbage_store_falls_back_to_defaults() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("secure_store.json"), "{ invalid json }}}}").unwrap();

    cli(&temp_dir)
        .args(["theme", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mode: system"));

    // The next write replaces the corrupted file with a valid one
    cli(&temp_dir).args(["theme", "set", "dark"]).assert().success();
    cli(&temp_dir)
        .args(["theme", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mode: dark"));
}

#[test]
fn test_tampered_ciphertext_falls_back_to_defaults() {
    let temp_dir = setup_test_dir();
    let store_path = temp_dir.path().join("data").join("secure_store.json");

    cli(&temp_dir)
        .args(["settings", "set", "--language", "fr"])
        .assert()
        .success();

    let mut file: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&store_path).unwrap()).unwrap();
    file["ciphertext"] = serde_json::Value::String("AAAAAAAAAAAAAAAAAAAAAAAA".into());
    fs::write(&store_path, file.to_string()).unwrap();

    cli(&temp_dir)
        .args(["settings", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"language\": \"en\""));
}

#[test]
fn test_truncated_store_file() {
    let temp_dir = setup_test_dir();
    let store_path = temp_dir.path().join("data").join("secure_store.json");

    cli(&temp_dir)
        .args(["log", "add", "--type", "sleep", "--value", "7"])
        .assert()
        .success();

    let contents = fs::read_to_string(&store_path).unwrap();
    fs::write(&store_path, &contents[..contents.len() / 2]).unwrap();

    cli(&temp_dir)
        .args(["log", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No pending logs"));
}

#[test]
fn test_replaced_key_reads_as_empty_store() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");

    cli(&temp_dir).args(["theme", "set", "dark"]).assert().success();

    // A fresh key is generated when the key file disappears
    fs::remove_file(data_dir.join("storage.key")).unwrap();

    cli(&temp_dir)
        .args(["theme", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("mode: system"));
}

#[test]
fn test_invalid_key_file_is_an_error() {
    let temp_dir = setup_test_dir();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("storage.key"), "not-base64!!").unwrap();

    cli(&temp_dir).args(["theme", "show"]).assert().failure();
}

#[test]
fn test_malformed_config_is_an_error() {
    let temp_dir = setup_test_dir();
    let config_dir = temp_dir.path().join("config").join("vital");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("config.toml"), "[api\nbase_url = ").unwrap();

    cli(&temp_dir).args(["theme", "show"]).assert().failure();
}
