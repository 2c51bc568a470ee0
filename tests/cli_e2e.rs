//! End-to-end CLI tests for the ftcr binary.
#![allow(deprecated)]

mod support;

use assert_cmd::Command;
use predicates::prelude::*;
use support::{authority, mount_image, mount_page, start_mock_server_or_skip};
use tempfile::TempDir;

/// A command with an isolated config directory so a developer's own
/// `~/.config/ftcr/config.toml` never leaks into the run.
fn ftcr(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("ftcr").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_invocation_without_urls_returns_zero() {
    let home = TempDir::new().unwrap();
    ftcr(&home).assert().success();
}

#[test]
fn test_binary_help_displays_usage() {
    let home = TempDir::new().unwrap();
    ftcr(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Collect images"));
}

#[test]
fn test_binary_version_displays_version() {
    let home = TempDir::new().unwrap();
    ftcr(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("ftcr"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let home = TempDir::new().unwrap();
    ftcr(&home)
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_binary_quiet_and_verbose_flags_accepted() {
    let home = TempDir::new().unwrap();
    ftcr(&home).arg("-q").assert().success();
    ftcr(&home).arg("-vv").assert().success();
}

#[test]
fn test_binary_invalid_url_exits_with_failure() {
    let home = TempDir::new().unwrap();
    ftcr(&home)
        .args(["-q", "http://"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("error: http://"));
}

#[test]
fn test_binary_lan_only_rejects_public_host() {
    let home = TempDir::new().unwrap();
    ftcr(&home)
        .args(["-q", "--lan-only", "example.com/photo.jpg"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not a local network address"));
}

#[test]
fn test_binary_rejects_unknown_config_key() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("bad.toml");
    std::fs::write(&config, "colour = \"blue\"\n").unwrap();

    ftcr(&home)
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("colour"));
}

#[test]
fn test_binary_missing_explicit_config_fails() {
    let home = TempDir::new().unwrap();
    ftcr(&home)
        .arg("--config")
        .arg(home.path().join("absent.toml"))
        .assert()
        .failure();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_fetches_image_and_prints_size() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_image(&server, "/photo.jpg", &[1, 2, 3, 4]).await;
    let home = TempDir::new().unwrap();

    ftcr(&home)
        .args(["-q", "--no-progress", "--scheme", "http"])
        .arg(format!("{}/photo.jpg", authority(&server)))
        .assert()
        .success()
        .stdout(predicate::str::contains("photo.jpg  4 B"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_json_summary_for_page() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_page(&server, "/gallery", r#"<a href="/full/cat.png">cat</a>"#).await;
    mount_image(&server, "/full/cat.png", b"meow").await;
    let home = TempDir::new().unwrap();

    let output = ftcr(&home)
        .args(["-q", "--json", "--scheme", "http"])
        .arg(format!("{}/gallery", authority(&server)))
        .output()
        .unwrap();

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let member = &summary["collections"][0]["members"][0];
    assert_eq!(member["name"], "cat.png");
    assert_eq!(member["fetch"]["outcome"], "stored");
    assert_eq!(member["fetch"]["bytes"], 4);
    assert!(summary["failures"].as_array().unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_scheme_from_config_file() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_image(&server, "/dog.gif", b"GIF").await;
    let home = TempDir::new().unwrap();
    let dir = home.path().join("ftcr");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.toml"), "default_scheme = \"http\"\n").unwrap();

    ftcr(&home)
        .arg("-q")
        .arg(format!("{}/dog.gif", authority(&server)))
        .assert()
        .success()
        .stdout(predicate::str::contains("dog.gif  3 B"));
}
