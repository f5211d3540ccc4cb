//! Logger bot exports (JavaScript timestamps, avatar URLs, inline embeds).
//!
//! ```text
//! name#1234 (uid) | (avatar-url) | Mon Jan 07 2019 12:34:56 GMT+0000 (zone name): content | {"embeds": [...]} |  =====> Attachment:file:url
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{Grammar, avatar_url, compile, optional, required};
use crate::extract::{RawFields, RawTimestamp, decode_embeds, split_attachments};
use crate::reassemble::Reassembly;
use crate::timestamp::TimeFormat;

static RECORD: LazyLock<Regex> = LazyLock::new(|| {
    compile(concat!(
        r"(?m)^(?P<uname>.*?)#(?P<disc>\d{4}) \((?P<uid>\d{15,20})\) \| \((?P<avatar>",
        avatar_url!(),
        r")\) \| (?P<time>[\w :+-]{33}) \([\w ]+\): (?P<content>[\s\S]*?) \| (?P<embeds>\{.*?)? \| (?: =====> Attachment:.*?:(?P<attach>https?:.*))?$",
    ))
});

pub struct Logger;

pub struct LoggerRecord {
    username: String,
    discriminator: String,
    user_id: String,
    avatar_url: String,
    time: String,
    content: String,
    embeds: Option<String>,
    attachments: Option<String>,
}

impl Grammar for Logger {
    type Record = LoggerRecord;

    const REASSEMBLY: Reassembly = Reassembly::WholeText;

    fn record_pattern() -> &'static Regex {
        &RECORD
    }

    fn record(caps: &Captures<'_>) -> Option<LoggerRecord> {
        Some(LoggerRecord {
            username: required(caps, "uname")?,
            discriminator: required(caps, "disc")?,
            user_id: required(caps, "uid")?,
            avatar_url: required(caps, "avatar")?,
            time: required(caps, "time")?,
            content: required(caps, "content")?,
            embeds: optional(caps, "embeds"),
            attachments: optional(caps, "attach"),
        })
    }
}

impl From<LoggerRecord> for RawFields {
    fn from(r: LoggerRecord) -> Self {
        Self {
            user_id: Some(r.user_id),
            username: Some(r.username),
            discriminator: Some(r.discriminator),
            avatar: Some(r.avatar_url),
            content: r.content,
            timestamp: Some(RawTimestamp::new(r.time, TimeFormat::JsDate)),
            attachments: split_attachments(r.attachments.as_deref(), ", "),
            embeds: decode_embeds(r.embeds.as_deref()),
            ..Self::default()
        }
    }
}
