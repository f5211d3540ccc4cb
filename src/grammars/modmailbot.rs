//! ModMailBot thread logs.
//!
//! A thread starts with a header that ends in a rule line. Messages then look
//! like:
//!
//! ```text
//! [2019-01-07 12:34:56] [FROM USER] [name#1234] content
//! [2019-01-07 12:35:00] [TO USER] [name#0001] (Anonymous) Moderator: content
//! [2019-01-07 12:35:30] Thread was closed by name#0001
//! ```
//!
//! Lines without a `[FROM USER]`-style tag are bot notices and are skipped.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{Grammar, compile, optional, required};
use crate::extract::{RawFields, RawTimestamp, split_attachments};
use crate::reassemble::Reassembly;
use crate::timestamp::TimeFormat;

/// Line that closes the thread header.
const HEADER_RULE: &str = "────────────────\n";

static RECORD: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"^\[(?P<time>[\d :-]{19})\](?: \[(?:FROM USER|TO USER|CHAT|COMMAND)\] \[(?P<uname>.*?)(?:#(?P<disc>\d{4}))?\](?: \(Anonymous\) [^:]+?:)? (?P<content>[\s\S]*?)(?:\n\n\*\*Attachment:\*\* (?P<attach>https?:.*))?$| (?P<notice>[^\n]+))",
    )
});

static RECORD_START: LazyLock<Regex> = LazyLock::new(|| compile(r"^\[[\d :-]{19}\]"));

pub struct ModMailBot;

pub struct ModMailBotRecord {
    time: String,
    username: String,
    discriminator: Option<String>,
    content: String,
    attachments: Option<String>,
}

impl Grammar for ModMailBot {
    type Record = ModMailBotRecord;

    const REASSEMBLY: Reassembly = Reassembly::Split { delimiter: "\n" };

    fn record_pattern() -> &'static Regex {
        &RECORD
    }

    fn record_start() -> &'static Regex {
        &RECORD_START
    }

    fn preprocess(text: &str) -> Cow<'_, str> {
        let body = text.split_once(HEADER_RULE).map_or(text, |(_, rest)| rest);
        Cow::Borrowed(body.strip_suffix('\n').unwrap_or(body))
    }

    fn record(caps: &Captures<'_>) -> Option<ModMailBotRecord> {
        if caps.name("notice").is_some() {
            return None;
        }
        Some(ModMailBotRecord {
            time: required(caps, "time")?,
            username: required(caps, "uname")?,
            discriminator: optional(caps, "disc"),
            content: required(caps, "content")?,
            attachments: optional(caps, "attach"),
        })
    }
}

impl From<ModMailBotRecord> for RawFields {
    fn from(r: ModMailBotRecord) -> Self {
        Self {
            username: Some(r.username),
            discriminator: r.discriminator,
            content: r.content,
            timestamp: Some(RawTimestamp::new(r.time, TimeFormat::SpaceSeparated)),
            attachments: split_attachments(r.attachments.as_deref(), ", "),
            ..Self::default()
        }
    }
}
