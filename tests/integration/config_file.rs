//! Config file discovery, precedence and validation.

use std::fs;

use predicates::prelude::*;
use tempfile::TempDir;

use crate::{fixture, logview};

/// A config directory holding `logview/config.toml` with `contents`.
fn xdg_config(contents: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    let app = dir.path().join("logview");
    fs::create_dir_all(&app).unwrap();
    fs::write(app.join("config.toml"), contents).unwrap();
    dir
}

#[test]
fn log_type_from_xdg_config() {
    let dir = xdg_config("log_type = \"gearbot\"\n");
    let output = logview()
        .env("XDG_CONFIG_HOME", dir.path())
        .arg("parse")
        .arg(fixture("gearbot.txt"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let log: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(log["log_type"], "gearbot");
}

#[test]
fn cli_type_overrides_config() {
    let dir = xdg_config("log_type = \"vortex\"\n");
    logview()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["parse", "--type", "rowboat"])
        .arg(fixture("rowboat.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("\"log_type\":\"rowboat\""));
}

#[test]
fn explicit_config_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("custom.toml");
    fs::write(&path, "page_size = 1\npretty = true\n").unwrap();

    let output = logview()
        .arg("--config")
        .arg(&path)
        .args(["parse", "--type", "rowboat", "--pages"])
        .arg(fixture("rowboat.txt"))
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("{\n  "));
    let log: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(log["pages"].as_array().unwrap().len(), 3);
}

#[test]
fn format_section() {
    let dir = xdg_config("[format]\nnewlines = false\nmasked_links = true\n");
    logview()
        .env("XDG_CONFIG_HOME", dir.path())
        .args(["format", "[a](https://x.com)\nb"])
        .assert()
        .success()
        .stdout("<a href=\"https://x.com\">a</a>\nb\n");
}

#[test]
fn invalid_toml() {
    let dir = xdg_config("log_type = \n");
    logview()
        .env("XDG_CONFIG_HOME", dir.path())
        .arg("types")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config file error"));
}

#[test]
fn unknown_key() {
    let dir = xdg_config("colour = \"never\"\n");
    logview()
        .env("XDG_CONFIG_HOME", dir.path())
        .arg("types")
        .assert()
        .code(1);
}

#[test]
fn unknown_log_type_in_config() {
    let dir = xdg_config("log_type = \"irc\"\n");
    logview()
        .env("XDG_CONFIG_HOME", dir.path())
        .arg("types")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown log type 'irc'"));
}

#[test]
fn missing_explicit_config() {
    logview()
        .args(["--config", "/nonexistent/logview.toml", "types"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("does not exist"));
}
