//! SajuukBot logs: one line per message header, continuation lines follow.
//!
//! ```text
//! [2019-01-07 12:34:56.789012] name#1234 (mid / uid / cid): content (url, url)
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{Grammar, compile, optional, required};
use crate::extract::{RawFields, RawTimestamp, split_attachments};
use crate::reassemble::Reassembly;
use crate::timestamp::TimeFormat;

static RECORD: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"^\[(?P<time>[\w :.-]{19,26})\] (?P<uname>.*?)#(?P<disc>\d{4}) \((?P<mid>\d{15,20}) / (?P<uid>\d{15,20}) / (?P<cid>\d{15,20})\): (?P<content>[\s\S]*?)(?: \((?P<attach>https?:.*)\))?$",
    )
});

static RECORD_START: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^\[[\w :.-]{19,26}\] .*?#\d{4} \(\d{15,20} / \d{15,20} / \d{15,20}\): ")
});

pub struct SajuukBot;

pub struct SajuukBotRecord {
    time: String,
    username: String,
    discriminator: String,
    message_id: String,
    user_id: String,
    channel_id: String,
    content: String,
    attachments: Option<String>,
}

impl Grammar for SajuukBot {
    type Record = SajuukBotRecord;

    const REASSEMBLY: Reassembly = Reassembly::Split { delimiter: "\n" };

    fn record_pattern() -> &'static Regex {
        &RECORD
    }

    fn record_start() -> &'static Regex {
        &RECORD_START
    }

    fn record(caps: &Captures<'_>) -> Option<SajuukBotRecord> {
        Some(SajuukBotRecord {
            time: required(caps, "time")?,
            username: required(caps, "uname")?,
            discriminator: required(caps, "disc")?,
            message_id: required(caps, "mid")?,
            user_id: required(caps, "uid")?,
            channel_id: required(caps, "cid")?,
            content: required(caps, "content")?,
            attachments: optional(caps, "attach"),
        })
    }
}

impl From<SajuukBotRecord> for RawFields {
    fn from(r: SajuukBotRecord) -> Self {
        Self {
            message_id: Some(r.message_id),
            channel_id: Some(r.channel_id),
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
