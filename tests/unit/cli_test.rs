//! Integration tests for the reviewbot CLI

use assert_cmd::cargo;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

fn reviewbot() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::new(cargo::cargo_bin!("reviewbot"));
    cmd.env_remove("REVIEWBOT_PASSWORD").env_remove("REVIEWBOT_TOKEN");
    cmd
}

fn write_config(temp: &TempDir, content: &str) -> std::path::PathBuf {
    let path = temp.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_version() {
    reviewbot()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("reviewbot"));
}

#[test]
fn test_help_lists_subcommands() {
    reviewbot()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("id"))
        .stdout(predicate::str::contains("review"))
        .stdout(predicate::str::contains("project"))
        .stdout(predicate::str::contains("fetch"));
}

#[test]
fn test_id_requires_ids() {
    reviewbot().arg("id").assert().failure();
}

#[test]
fn test_unknown_review_mode_rejected() {
    reviewbot()
        .args(["--review-mode", "sometimes", "review"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sometimes"));
}

#[test]
#[serial]
fn test_missing_api_url_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, "[review]\nuser = \"bot\"\n");

    reviewbot()
        .arg("--config")
        .arg(&config)
        .args(["id", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing API URL"));
}

#[test]
#[serial]
fn test_fallback_mode_without_fallback_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, "[api]\nurl = \"http://127.0.0.1:9\"\nusername = \"bot\"\n");

    reviewbot()
        .arg("--config")
        .arg(&config)
        .args(["--review-mode", "fallback-onfail", "review"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("fallback"));
}

#[test]
#[serial]
fn test_unknown_platform_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(
        &temp,
        "[api]\nplatform = \"gerrit\"\nurl = \"http://127.0.0.1:9\"\nusername = \"bot\"\n",
    );

    reviewbot()
        .arg("--config")
        .arg(&config)
        .args(["id", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown platform"));
}

#[test]
#[serial]
fn test_invalid_config_file_fails() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, "[api\nurl = ");

    reviewbot()
        .arg("--config")
        .arg(&config)
        .args(["id", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config"));
}

#[test]
fn test_missing_explicit_config_fails() {
    reviewbot()
        .args(["--config", "/nonexistent/reviewbot.toml", "id", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read config"));
}

#[test]
#[serial]
fn test_unreachable_api_fails_one_shot() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, "[api]\nurl = \"http://127.0.0.1:9\"\nusername = \"bot\"\n");

    reviewbot()
        .arg("--config")
        .arg(&config)
        .args(["id", "1"])
        .assert()
        .failure()
        .code(1);
}

const WORKFLOW_CONTEXT: &str = r#"{"sha":"0f1e2d3c","event":{"pull_request":{"head":{"repo":{"full_name":"alice/vim"}},"base":{"repo":{"full_name":"pool/vim"}},"user":{"login":"alice"},"created_at":"2024-03-01T09:00:00Z","body":"update"}}}"#;

#[test]
#[serial]
fn test_action_platform_reviews_workflow_pull_request() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, "[api]\nplatform = \"action\"\n\n[review]\nuser = \"bot\"\n");

    reviewbot()
        .env("GITHUB_CONTEXT", WORKFLOW_CONTEXT)
        .arg("--config")
        .arg(&config)
        .args(["--json", "id", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""platform": "action""#))
        .stdout(predicate::str::contains(r#""id": "1""#));
}

#[test]
#[serial]
fn test_action_platform_needs_workflow_context() {
    let temp = TempDir::new().unwrap();
    let config = write_config(&temp, "[api]\nplatform = \"action\"\n\n[review]\nuser = \"bot\"\n");

    reviewbot()
        .env_remove("GITHUB_CONTEXT")
        .arg("--config")
        .arg(&config)
        .args(["id", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GITHUB_CONTEXT"));
}
