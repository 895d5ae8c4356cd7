use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Write a config whose store lives inside `dir`
fn config_in(dir: &TempDir) -> String {
    let store = dir.path().join("store.json");
    let config = dir.path().join("pinpix.toml");
    fs::write(
        &config,
        format!(
            "[flickr]\nbase_url = \"http://127.0.0.1:9/rest\"\ntimeout_secs = 2\n\n[store]\npath = {:?}\n",
            store.display().to_string()
        ),
    )
    .unwrap();
    config.display().to_string()
}

fn pinpix(config: &str) -> Command {
    let mut cmd = Command::cargo_bin("pinpix").unwrap();
    cmd.env_remove("FLICKR_API_KEY")
        .env_remove("RUST_LOG")
        .arg("--config")
        .arg(config);
    cmd
}

#[test]
fn help_lists_commands() {
    Command::cargo_bin("pinpix")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("photos"))
        .stdout(predicate::str::contains("download"));
}

#[test]
fn pin_then_list() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    pinpix(&config)
        .args(["pin", "sf", "--lat", "37.7749", "--lon", "-122.4194"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pinned sf"));

    let output = pinpix(&config).args(["pins", "--json"]).output().unwrap();
    assert!(output.status.success());
    let pins: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(pins[0]["key"], "sf");
    assert_eq!(pins[0]["longitude"], -122.4194);
    assert_eq!(pins[0]["photos"], 0);
    assert!(pins[0]["next_page"].is_null());

    pinpix(&config)
        .args(["unpin", "sf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed sf"));
}

#[test]
fn pin_rejects_pole() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    pinpix(&config)
        .args(["pin", "north", "--lat", "90", "--lon", "0"])
        .assert()
        .code(2);
}

#[test]
fn photos_without_api_key() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    pinpix(&config)
        .args(["photos", "sf"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("api_key"));
}

#[test]
fn photos_for_unknown_pin() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    pinpix(&config)
        .env("FLICKR_API_KEY", "test-key")
        .args(["photos", "atlantis", "--json"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("atlantis"));
}

#[test]
fn missing_config_file() {
    Command::cargo_bin("pinpix")
        .unwrap()
        .args(["--config", "/definitely/not/here.toml", "pins"])
        .assert()
        .code(3);
}

#[test]
fn search_rejects_page_zero() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir);

    pinpix(&config)
        .env("FLICKR_API_KEY", "test-key")
        .args(["search", "--lat", "0", "--lon", "0", "--page", "0"])
        .assert()
        .code(2);
}
