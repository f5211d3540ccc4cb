//! Every supported log format parsed from a fixture file.

use jiff::Timestamp;
use serde_json::Value;

use crate::{fixture, logview, parse_json};

/// Parse a fixture and check the message count and chronological order.
fn check(tag: &str, file: &str, expected: usize) -> Value {
    let log = parse_json(&["--type", tag, &fixture(file)]);
    assert_eq!(log["log_type"], tag);

    let messages = log["messages"].as_array().unwrap();
    assert_eq!(messages.len(), expected, "{tag}: wrong message count");

    let times: Vec<Timestamp> = messages
        .iter()
        .filter_map(|m| m["timestamp"].as_str())
        .map(|t| t.parse().unwrap())
        .collect();
    assert!(
        times.windows(2).all(|w| w[0] <= w[1]),
        "{tag}: messages out of order: {times:?}"
    );
    for message in messages {
        assert_eq!(message["error"], false, "{tag}: unexpected placeholder {message}");
    }
    log
}

#[test]
fn rowboat() {
    let log = check("rowboat", "rowboat.txt", 3);
    let messages = log["messages"].as_array().unwrap();
    assert!(messages[0]["content"].as_str().unwrap().contains("<b>world</b>"));
    assert_eq!(messages[2]["attachments"].as_array().unwrap().len(), 2);
}

#[test]
fn gearbot() {
    let log = check("gearbot", "gearbot.txt", 2);
    assert_eq!(log["messages"][1]["attachments"][0]["filename"], "doc.txt");
}

#[test]
fn capnbot() {
    let log = check("capnbot", "capnbot.txt", 2);
    assert_eq!(log["messages"][1]["embeds"][0]["title"], "Card");
}

#[test]
fn logger() {
    check("logger", "logger.txt", 2);
}

#[test]
fn auttaja() {
    check("auttaja", "auttaja.txt", 3);
}

#[test]
fn vortex() {
    let log = check("vortex", "vortex.txt", 3);
    assert_eq!(log["messages"][1]["attachments"].as_array().unwrap().len(), 2);
}

#[test]
fn sajuukbot() {
    check("sajuukbot", "sajuukbot.txt", 3);
}

#[test]
fn invite_deleter() {
    let log = check("invite_deleter", "invite_deleter.txt", 2);
    assert!(log["messages"][0]["timestamp"].is_null());
}

#[test]
fn modmailbot() {
    check("modmailbot", "modmailbot.txt", 3);
}

#[test]
fn rosalina_bottings() {
    check("rosalina_bottings", "rosalina_bottings.txt", 2);
}

#[test]
fn giraffeduck() {
    let log = check("giraffeduck", "giraffeduck.txt", 2);
    assert_eq!(log["messages"][1]["embeds"][0]["title"], "Embed title");
}

#[test]
fn giraffeduck_deeply_nested_embed_is_dropped() {
    let text = std::fs::read_to_string(fixture("giraffeduck.txt")).unwrap();
    let nested = "[".repeat(200_000);
    let input = text.replacen("RichEmbed: null", &format!("RichEmbed: {nested}"), 1);

    let output = logview()
        .args(["parse", "--type", "giraffeduck"])
        .write_stdin(input)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let log: Value = serde_json::from_slice(&output.stdout).unwrap();
    let messages = log["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert!(messages[0]["embeds"].as_array().unwrap().is_empty());
    assert_eq!(messages[0]["error"], false);
    assert_eq!(messages[1]["embeds"][0]["title"], "Embed title");
}

#[test]
fn rowboat_family_aliases() {
    for tag in ["aperture", "speedboat", "lmg_showboat"] {
        check(tag, "rowboat.txt", 3);
    }
}

#[test]
fn discord_json() {
    let log = check("discord_json", "discord.json", 2);
    let messages = log["messages"].as_array().unwrap();

    // Input order is newest first; output is chronological.
    assert_eq!(messages[0]["author"]["username"], "Alice");
    assert_eq!(messages[0]["attachments"][0]["is_image"], true);
    assert_eq!(messages[0]["attachments"][0]["size"], 1536);

    let bob = &messages[1];
    assert_eq!(bob["author"]["bot"], true);
    assert_eq!(bob["edited"], true);
    assert_eq!(bob["embeds"][0]["color"], 3447003);
    assert_eq!(
        bob["embeds"][0]["description"],
        r#"see <a href="https://docs.rs">docs</a>"#
    );
}
