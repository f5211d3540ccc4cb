//! Auttaja logs: one paragraph per message, blank-line separated.
//!
//! ```text
//! [Mon Jan 07 12:34:56 2019] (name#1234 - uid) [mid]: content url url
//! ```

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{Grammar, compile, optional, required};
use crate::extract::{RawFields, RawTimestamp, split_attachments};
use crate::reassemble::Reassembly;
use crate::timestamp::TimeFormat;

static RECORD: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"^\[(?P<time>[\w :]{24,25})\] \((?P<uname>.*?)#(?P<disc>\d{4}) - (?P<uid>\d{15,20})\) \[(?P<mid>\d{15,20})\]: (?P<content>[\s\S]*?)(?: (?P<attach>https?://\S+(?: https?://\S+)*))?$",
    )
});

static RECORD_START: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^\[[\w :]{24,25}\] \(.*?#\d{4} - \d{15,20}\) \[\d{15,20}\]: ")
});

pub struct Auttaja;

pub struct AuttajaRecord {
    time: String,
    username: String,
    discriminator: String,
    user_id: String,
    message_id: String,
    content: String,
    attachments: Option<String>,
}

impl Grammar for Auttaja {
    type Record = AuttajaRecord;

    const REASSEMBLY: Reassembly = Reassembly::Split { delimiter: "\n\n" };

    fn record_pattern() -> &'static Regex {
        &RECORD
    }

    fn record_start() -> &'static Regex {
        &RECORD_START
    }

    fn preprocess(text: &str) -> Cow<'_, str> {
        Cow::Borrowed(text.strip_suffix('\n').unwrap_or(text))
    }

    fn record(caps: &Captures<'_>) -> Option<AuttajaRecord> {
        Some(AuttajaRecord {
            time: required(caps, "time")?,
            username: required(caps, "uname")?,
            discriminator: required(caps, "disc")?,
            user_id: required(caps, "uid")?,
            message_id: required(caps, "mid")?,
            content: required(caps, "content")?,
            attachments: optional(caps, "attach"),
        })
    }
}

impl From<AuttajaRecord> for RawFields {
    fn from(r: AuttajaRecord) -> Self {
        Self {
            message_id: Some(r.message_id),
            user_id: Some(r.user_id),
            username: Some(r.username),
            discriminator: Some(r.discriminator),
            content: r.content,
            timestamp: Some(RawTimestamp::new(r.time, TimeFormat::Ctime)),
            attachments: split_attachments(r.attachments.as_deref(), " "),
            ..Self::default()
        }
    }
}
