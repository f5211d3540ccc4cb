//! Rosalina Bottings logs. Users have no discriminator in this format.
//!
//! ```text
//! 2019-01-07T12:34:56.789+00:00 | guild[gid] |  channel[cid] | name[uid] | said: content
//! Attachment: url
//! Message ID: mid
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{Grammar, compile, optional, required};
use crate::extract::{RawFields, RawTimestamp, split_attachments};
use crate::reassemble::Reassembly;
use crate::timestamp::TimeFormat;

static RECORD: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?m)^(?P<time>[\d-]{10}T[\d:.]{8,15})(?:[+-][\d:]{5}|Z) \| (?P<gname>.*?)\[(?P<gid>\d{15,20})\] \|  (?P<cname>[\w-]{1,100})\[(?P<cid>\d{15,20})\] \| (?P<uname>.*?)\[(?P<uid>\d{15,20})\] \| said: (?P<content>[\s\S]*?)(?:\nAttachment: (?P<attach>https?:.*))?\nMessage ID: (?P<mid>\d{15,20})$",
    )
});

pub struct RosalinaBottings;

pub struct RosalinaRecord {
    time: String,
    guild_id: String,
    channel_id: String,
    username: String,
    user_id: String,
    content: String,
    attachments: Option<String>,
    message_id: String,
}

impl Grammar for RosalinaBottings {
    type Record = RosalinaRecord;

    const REASSEMBLY: Reassembly = Reassembly::WholeText;

    fn record_pattern() -> &'static Regex {
        &RECORD
    }

    fn record(caps: &Captures<'_>) -> Option<RosalinaRecord> {
        Some(RosalinaRecord {
            time: required(caps, "time")?,
            guild_id: required(caps, "gid")?,
            channel_id: required(caps, "cid")?,
            username: required(caps, "uname")?,
            user_id: required(caps, "uid")?,
            content: required(caps, "content")?,
            attachments: optional(caps, "attach"),
            message_id: required(caps, "mid")?,
        })
    }
}

impl From<RosalinaRecord> for RawFields {
    fn from(r: RosalinaRecord) -> Self {
        Self {
            message_id: Some(r.message_id),
            channel_id: Some(r.channel_id),
            guild_id: Some(r.guild_id),
            user_id: Some(r.user_id),
            username: Some(r.username),
            content: r.content,
            timestamp: Some(RawTimestamp::new(r.time, TimeFormat::IsoLocal)),
            attachments: split_attachments(r.attachments.as_deref(), ", "),
            ..Self::default()
        }
    }
}
