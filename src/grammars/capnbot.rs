//! CapnBot logs, which record the author's avatar URL and inline embeds.
//!
//! ```text
//! 2019-01-07 12:34:56.789012 (mid / gid / uid) (avatar-url) name#1234: content | url, url | {"embeds": [...]}
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{Grammar, avatar_url, compile, optional, required};
use crate::extract::{RawFields, RawTimestamp, decode_embeds, split_attachments};
use crate::reassemble::Reassembly;
use crate::timestamp::TimeFormat;

static RECORD: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"(?m)^(?P<time>[\d\-: .]{19,26}) \((?P<mid>\d{15,20}) / (?P<gid>\d{15,20}) / (?P<uid>\d{15,20})\) \((?P<avatar>",
        avatar_url!(),
        r")\) (?P<uname>.*?)#(?P<disc>\d{4}): (?P<content>[\s\S]*?) \| (?P<attach>https?:.*)? \| (?P<embeds>\{.*)?$",
    ))
});

pub struct CapnBot;

pub struct CapnBotRecord {
    time: String,
    message_id: String,
    guild_id: String,
    user_id: String,
    avatar_url: String,
    username: String,
    discriminator: String,
    content: String,
    attachments: Option<String>,
    embeds: Option<String>,
}

impl Grammar for CapnBot {
    type Record = CapnBotRecord;

    const REASSEMBLY: Reassembly = Reassembly::WholeText;

    fn record_pattern() -> &'static Regex {
        &RECORD
    }

    fn record(caps: &Captures<'_>) -> Option<CapnBotRecord> {
        Some(CapnBotRecord {
            time: required(caps, "time")?,
            message_id: required(caps, "mid")?,
            guild_id: required(caps, "gid")?,
            user_id: required(caps, "uid")?,
            avatar_url: required(caps, "avatar")?,
            username: required(caps, "uname")?,
            discriminator: required(caps, "disc")?,
            content: required(caps, "content")?,
            attachments: optional(caps, "attach"),
            embeds: optional(caps, "embeds"),
        })
    }
}

impl From<CapnBotRecord> for RawFields {
    fn from(r: CapnBotRecord) -> Self {
        Self {
            message_id: Some(r.message_id),
            guild_id: Some(r.guild_id),
            user_id: Some(r.user_id),
            username: Some(r.username),
            discriminator: Some(r.discriminator),
            avatar: Some(r.avatar_url),
            content: r.content,
            timestamp: Some(RawTimestamp::new(r.time, TimeFormat::SpaceSeparated)),
            attachments: split_attachments(r.attachments.as_deref(), ", "),
            embeds: decode_embeds(r.embeds.as_deref()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;

    const LOG: &str = concat!(
        "2019-01-07 12:34:56.789012 (532000000000000001 / 532000000000000100 / 132000000000000001) ",
        "(https://cdn.discordapp.com/avatars/132000000000000001/abcdef.png) Alice#1234: Hello |  | \n",
        "2019-01-07 12:35:00 (532000000000000002 / 532000000000000100 / 132000000000000002) ",
        "(https://cdn.discordapp.com/embed/avatars/2.png) Bob#0042: look | https://cdn.discordapp.com/attachments/1/2/g.png | ",
        r#"{"embeds": [{"title": "Card", "fields": [{"name": "a", "value": "1", "inline": true}]}]}"#,
    );

    #[test]
    fn test_plain_record() {
        let records = extract::<CapnBot>(LOG);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].content, "Hello");
        assert_eq!(
            records[0].avatar.as_deref(),
            Some("https://cdn.discordapp.com/avatars/132000000000000001/abcdef.png")
        );
        assert!(records[0].embeds.is_empty());
        assert_eq!(records[0].timestamp.as_ref().unwrap().text, "2019-01-07 12:34:56.789012");
    }

    #[test]
    fn test_attachment_and_embed() {
        let records = extract::<CapnBot>(LOG);
        assert_eq!(records[1].timestamp.as_ref().unwrap().text, "2019-01-07 12:35:00");
        assert_eq!(records[1].attachments.len(), 1);
        assert_eq!(records[1].embeds.len(), 1);
        assert_eq!(records[1].embeds[0]["title"], "Card");
    }
}
