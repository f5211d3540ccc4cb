//! GearBot archive logs.
//!
//! ```text
//! 2019-01-07 12:34:56.789012 gid - cid - mid | name#1234 (uid) | content | url, url
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{Grammar, compile, optional, required};
use crate::extract::{RawFields, RawTimestamp, split_attachments};
use crate::reassemble::Reassembly;
use crate::timestamp::TimeFormat;

static RECORD: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?m)^(?P<time>[\w\-. :]{26}) (?P<gid>\d{15,20}) - (?P<cid>\d{15,20}) - (?P<mid>\d{15,20}) \| (?P<uname>.*?)#(?P<disc>\d{4}) \((?P<uid>\d{15,20})\) \| (?P<content>[\s\S]*?) \|(?: ?(?P<attach>https?:.*))?$",
    )
});

pub struct GearBot;

pub struct GearBotRecord {
    time: String,
    guild_id: String,
    channel_id: String,
    message_id: String,
    user_id: String,
    username: String,
    discriminator: String,
    content: String,
    attachments: Option<String>,
}

impl Grammar for GearBot {
    type Record = GearBotRecord;

    const REASSEMBLY: Reassembly = Reassembly::WholeText;

    fn record_pattern() -> &'static Regex {
        &RECORD
    }

    fn record(caps: &Captures<'_>) -> Option<GearBotRecord> {
        Some(GearBotRecord {
            time: required(caps, "time")?,
            guild_id: required(caps, "gid")?,
            channel_id: required(caps, "cid")?,
            message_id: required(caps, "mid")?,
            user_id: required(caps, "uid")?,
            username: required(caps, "uname")?,
            discriminator: required(caps, "disc")?,
            content: required(caps, "content")?,
            attachments: optional(caps, "attach"),
        })
    }
}

impl From<GearBotRecord> for RawFields {
    fn from(r: GearBotRecord) -> Self {
        Self {
            message_id: Some(r.message_id),
            channel_id: Some(r.channel_id),
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
