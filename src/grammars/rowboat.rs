//! Rowboat and the bots forked from it (Aperture, Flygbåt, Heimdallr, Jetski,
//! LMG Showboat, rawgoat, Speedboat).
//!
//! ```text
//! 2019-01-07 12:34:56.789012 (mid / gid / uid) name#1234: content (url, url)
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{Grammar, compile, optional, required};
use crate::extract::{RawFields, RawTimestamp, split_attachments};
use crate::reassemble::Reassembly;
use crate::timestamp::TimeFormat;

static RECORD: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?m)^(?P<time>[\d-]+ [\d:.]+) \((?P<mid>\d{15,20}) / (?P<gid>\d{15,20}) / (?P<uid>\d{15,20})\) (?P<uname>.*?)#(?P<disc>\d{4}): (?P<content>[\s\S]*?) \((?P<attach>https?:.*)?\)$",
    )
});

pub struct Rowboat;

pub struct RowboatRecord {
    time: String,
    message_id: String,
    guild_id: String,
    user_id: String,
    username: String,
    discriminator: String,
    content: String,
    attachments: Option<String>,
}

impl Grammar for Rowboat {
    type Record = RowboatRecord;

    const REASSEMBLY: Reassembly = Reassembly::WholeText;

    fn record_pattern() -> &'static Regex {
        &RECORD
    }

    fn record(caps: &Captures<'_>) -> Option<RowboatRecord> {
        Some(RowboatRecord {
            time: required(caps, "time")?,
            message_id: required(caps, "mid")?,
            guild_id: required(caps, "gid")?,
            user_id: required(caps, "uid")?,
            username: required(caps, "uname")?,
            discriminator: required(caps, "disc")?,
            content: required(caps, "content")?,
            attachments: optional(caps, "attach"),
        })
    }
}

impl From<RowboatRecord> for RawFields {
    fn from(r: RowboatRecord) -> Self {
        Self {
            message_id: Some(r.message_id),
            guild_id: Some(r.guild_id),
            user_id: Some(r.user_id),
            username: Some(r.username),
            discriminator: Some(r.discriminator),
            content: r.content,
            timestamp: Some(RawTimestamp::new(r.time, TimeFormat::SpaceSeparated)),
            attachments: split_attachments(r.attachments.as_deref(), ", "),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;

    const LOG: &str = "\
2019-01-07 12:34:56.789012 (532000000000000001 / 532000000000000100 / 132000000000000001) Alice#1234: Hello ()
2019-01-07 12:35:10.000001 (532000000000000002 / 532000000000000100 / 132000000000000002) Bob#0042: first line
second line ()
2019-01-07 12:36:00.500000 (532000000000000003 / 532000000000000100 / 132000000000000001) Alice#1234: two files (https://cdn.discordapp.com/attachments/1/2/a.png, https://cdn.discordapp.com/attachments/1/2/b.txt)";

    #[test]
    fn test_records() {
        let records = extract::<Rowboat>(LOG);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].username.as_deref(), Some("Alice"));
        assert_eq!(records[0].discriminator.as_deref(), Some("1234"));
        assert_eq!(records[0].content, "Hello");
        assert_eq!(records[0].guild_id.as_deref(), Some("532000000000000100"));
        assert!(records[0].attachments.is_empty());
    }

    #[test]
    fn test_multiline_content() {
        let records = extract::<Rowboat>(LOG);
        assert_eq!(records[1].content, "first line\nsecond line");
        assert_eq!(records[1].message_id.as_deref(), Some("532000000000000002"));
    }

    #[test]
    fn test_attachments() {
        let records = extract::<Rowboat>(LOG);
        assert_eq!(records[2].content, "two files");
        assert_eq!(records[2].attachments.len(), 2);
        assert!(records[2].attachments[1].ends_with("b.txt"));
    }
}
