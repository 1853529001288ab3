//! Integration tests for the minishop binary.
//!
//! These run the CLI end to end against the development mock layer:
//! - Login, whoami and logout persistence
//! - Authentication gating
//! - Product paging
//! - Local upload validation

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create a test data directory
fn setup_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Helper to get the path to the CLI binary
fn cli() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("minishop"))
}

/// Mock-mode config without artificial latency
fn write_config(dir: &Path) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(
        &path,
        "environment = \"development\"\n\n[mock]\nenabled = true\ndelay_min_ms = 0\ndelay_max_ms = 0\nseed = 7\n",
    )
    .expect("Failed to write config");
    path
}

/// CLI invocation with config and data dir pointed at `dir`
fn shop(dir: &Path) -> Command {
    let config = write_config(dir);
    let mut cmd = cli();
    cmd.arg("--config")
        .arg(config)
        .arg("--data-dir")
        .arg(dir.join("data"));
    cmd
}

#[test]
fn test_cli_help() {
    cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Command-line client for the minishop marketplace",
        ));
}

#[test]
fn test_whoami_when_logged_out() {
    let temp_dir = setup_test_dir();

    shop(temp_dir.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("not logged in"));
}

#[test]
fn test_login_persists_session() {
    let temp_dir = setup_test_dir();

    shop(temp_dir.path())
        .args(["login", "--code", "abc123"])
        .assert()
        .success()
        .stdout(predicate::str::contains("userId"));

    let session_path = temp_dir.path().join("data/session.json");
    assert!(session_path.exists(), "session file should exist");

    let contents = fs::read_to_string(&session_path).unwrap();
    let session: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let token = session["token"].as_str().expect("token stored");
    assert_eq!(token.len(), 32);

    shop(temp_dir.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("nickname"));
}

#[test]
fn test_whoami_refreshes_stale_profile() {
    let temp_dir = setup_test_dir();

    shop(temp_dir.path())
        .args(["login", "--code", "abc123"])
        .assert()
        .success();

    // Backdate the cached profile past the default seven days
    let session_path = temp_dir.path().join("data/session.json");
    let mut session: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&session_path).unwrap()).unwrap();
    session["saved_at"] = serde_json::json!("2000-01-01T00:00:00Z");
    session["profile"]["nickname"] = serde_json::json!("Outdated");
    fs::write(&session_path, session.to_string()).unwrap();

    shop(temp_dir.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Outdated").not());

    let session: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&session_path).unwrap()).unwrap();
    assert_ne!(session["saved_at"], "2000-01-01T00:00:00Z");
}

#[test]
fn test_login_with_empty_code_fails() {
    let temp_dir = setup_test_dir();

    shop(temp_dir.path())
        .args(["login", "--code", ""])
        .assert()
        .failure()
        .stderr(predicate::str::contains("login failed"));

    assert!(!temp_dir.path().join("data/session.json").exists());
}

#[test]
fn test_order_create_requires_login() {
    let temp_dir = setup_test_dir();

    shop(temp_dir.path())
        .args(["order-create", "--product", "p1", "--quantity", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("log in"));
}

#[test]
fn test_order_create_after_login() {
    let temp_dir = setup_test_dir();

    shop(temp_dir.path())
        .args(["login", "--code", "abc123"])
        .assert()
        .success();

    shop(temp_dir.path())
        .args(["order-create", "--product", "p1", "--quantity", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("TO_PAY"));
}

#[test]
fn test_products_page_is_bounded() {
    let temp_dir = setup_test_dir();

    let output = shop(temp_dir.path())
        .args(["products", "--page", "1", "--size", "10"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let page: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(page["items"].as_array().unwrap().len() <= 10);
    assert!(page["totalPages"].as_u64().unwrap() >= 1);
}

#[test]
fn test_upload_missing_file_fails_locally() {
    let temp_dir = setup_test_dir();

    shop(temp_dir.path())
        .args(["login", "--code", "abc123"])
        .assert()
        .success();

    shop(temp_dir.path())
        .arg("upload")
        .arg(temp_dir.path().join("missing.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_upload_records_history() {
    let temp_dir = setup_test_dir();
    let image = temp_dir.path().join("photo.png");
    fs::write(&image, b"not really a png").unwrap();

    shop(temp_dir.path())
        .args(["login", "--code", "abc123"])
        .assert()
        .success();

    shop(temp_dir.path())
        .arg("upload")
        .arg(&image)
        .assert()
        .success()
        .stdout(predicate::str::contains("url"));

    let contents = fs::read_to_string(temp_dir.path().join("data/session.json")).unwrap();
    let session: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(session["recent_uploads"].as_array().unwrap().len(), 1);
}

#[test]
fn test_logout_clears_session() {
    let temp_dir = setup_test_dir();

    shop(temp_dir.path())
        .args(["login", "--code", "abc123"])
        .assert()
        .success();

    shop(temp_dir.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));

    shop(temp_dir.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("not logged in"));
}

#[test]
fn test_unknown_order_status_rejected() {
    let temp_dir = setup_test_dir();

    shop(temp_dir.path())
        .args(["login", "--code", "abc123"])
        .assert()
        .success();

    shop(temp_dir.path())
        .args(["orders", "--status", "SHIPPED"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown order status"));
}

#[test]
fn test_unread_count_is_a_number() {
    let temp_dir = setup_test_dir();

    shop(temp_dir.path())
        .args(["login", "--code", "abc123"])
        .assert()
        .success();

    let output = shop(temp_dir.path()).arg("unread").output().unwrap();
    assert!(output.status.success());
    let count: usize = String::from_utf8(output.stdout)
        .unwrap()
        .trim()
        .parse()
        .unwrap();
    assert!(count <= 50);
}
