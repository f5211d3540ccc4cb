//! `logview format`: Discord markdown to HTML from the command line.

use predicates::prelude::*;

use crate::logview;

#[test]
fn format_argument() {
    logview()
        .args(["format", "**hi** there"])
        .assert()
        .success()
        .stdout("<b>hi</b> there\n");
}

#[test]
fn format_stdin() {
    logview()
        .arg("format")
        .write_stdin("a\nb")
        .assert()
        .success()
        .stdout("a<br>b\n");
}

#[test]
fn no_newlines() {
    logview()
        .args(["format", "--no-newlines", "a\nb"])
        .assert()
        .success()
        .stdout("a\nb\n");
}

#[test]
fn masked_links_flag() {
    logview()
        .args(["format", "[docs](https://docs.rs)"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[docs]("));

    logview()
        .args(["format", "--masked-links", "[docs](https://docs.rs)"])
        .assert()
        .success()
        .stdout("<a href=\"https://docs.rs\">docs</a>\n");
}

#[test]
fn custom_emoji_modes() {
    logview()
        .args(["format", "<:blob:1>"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cdn.discordapp.com/emojis/1.png"));

    logview()
        .args(["format", "--mode", "lite", "<:blob:1>"])
        .assert()
        .success()
        .stdout("&lt;:blob:1&gt;\n");
}

#[test]
fn escapes_html() {
    logview()
        .args(["format", "<script>&"])
        .assert()
        .success()
        .stdout("&lt;script&gt;&amp;\n");
}
