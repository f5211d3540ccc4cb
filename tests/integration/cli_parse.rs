//! `logview parse`: input sources, output shapes and exit codes.

use std::fs;
use std::io::Write;

use predicates::prelude::*;

use crate::{fixture, logview, parse_json};

#[test]
fn parse_file() {
    let log = parse_json(&["--type", "rowboat", &fixture("rowboat.txt")]);
    assert_eq!(log["log_type"], "rowboat");
    assert_eq!(log["messages"].as_array().unwrap().len(), 3);

    let users: Vec<&str> = log["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(users, ["Alice", "Bob"]);

    let raw = fs::read_to_string(fixture("rowboat.txt")).unwrap();
    assert_eq!(log["raw_content"], raw);
}

#[test]
fn parse_stdin() {
    let input = fs::read_to_string(fixture("sajuukbot.txt")).unwrap();
    let output = logview()
        .args(["parse", "-t", "SajuukBot"])
        .write_stdin(input)
        .output()
        .unwrap();
    assert!(output.status.success());
    let log: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(log["log_type"], "sajuukbot");
    assert_eq!(log["messages"].as_array().unwrap().len(), 3);
}

#[test]
fn whitespace_only_input_is_empty_log() {
    let output = logview()
        .args(["parse", "--type", "vortex"])
        .write_stdin("  \n\n")
        .output()
        .unwrap();
    assert!(output.status.success());
    let log: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(log["messages"].as_array().unwrap().is_empty());
    assert!(log["users"].as_array().unwrap().is_empty());
}

#[test]
fn pages() {
    let log = parse_json(&[
        "--type",
        "rowboat",
        "--pages",
        "--page-size",
        "2",
        &fixture("rowboat.txt"),
    ]);
    let pages = log["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0]["index"], 0);
    assert_eq!(pages[0]["messages"].as_array().unwrap().len(), 2);
    assert_eq!(pages[1]["messages"].as_array().unwrap().len(), 1);
    assert_eq!(log["users"].as_array().unwrap().len(), 2);
}

#[test]
fn page_size_zero_rejected() {
    logview()
        .args(["parse", "--type", "rowboat", "--page-size", "0"])
        .arg(fixture("rowboat.txt"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid page size"));
}

#[test]
fn pretty() {
    logview()
        .args(["parse", "--type", "rowboat", "--pretty"])
        .arg(fixture("rowboat.txt"))
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{\n  \"log_type\": \"rowboat\""));
}

#[test]
fn summary_on_stderr() {
    logview()
        .args(["parse", "--type", "rowboat", "--color", "never"])
        .arg(fixture("rowboat.txt"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Rowboat: 3 messages, 2 users, 0 errors"));
}

#[test]
fn json_flag() {
    let log = parse_json(&["--json", &fixture("discord.json")]);
    assert_eq!(log["log_type"], "discord_json");
    assert_eq!(log["messages"].as_array().unwrap().len(), 2);
}

#[test]
fn json_conflicts_with_type() {
    logview()
        .args(["parse", "--json", "--type", "rowboat"])
        .arg(fixture("discord.json"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cannot be used with"));
}

#[test]
fn missing_log_type() {
    logview()
        .arg("parse")
        .arg(fixture("rowboat.txt"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no log type given"));
}

#[test]
fn unknown_log_type() {
    logview()
        .args(["parse", "--type", "irc"])
        .arg(fixture("rowboat.txt"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid log type 'irc'"));
}

#[test]
fn missing_file() {
    logview()
        .args(["parse", "--type", "rowboat", "/nonexistent/log.txt"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("/nonexistent/log.txt"));
}

#[test]
fn unrecognized_format() {
    logview()
        .args(["parse", "--type", "vortex"])
        .arg(fixture("rowboat.txt"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("no Vortex records found in input"));
}

#[test]
fn invalid_utf8() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"2019-01-07 \xff\xfe broken").unwrap();

    logview()
        .args(["parse", "--type", "rowboat"])
        .arg(file.path())
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not valid UTF-8"));
}

#[test]
fn invalid_discord_json() {
    logview()
        .args(["parse", "--json"])
        .write_stdin(r#"{"id": "1"}"#)
        .assert()
        .code(3)
        .stderr(predicate::str::contains("invalid Discord message JSON"));
}

#[test]
fn types() {
    logview()
        .arg("types")
        .assert()
        .success()
        .stdout(predicate::str::contains("invite_deleter"))
        .stdout(predicate::str::contains("Rosalina Bottings"))
        .stdout(predicate::str::contains("discord_json"));
}

#[test]
fn completions() {
    logview()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("logview"));
}
