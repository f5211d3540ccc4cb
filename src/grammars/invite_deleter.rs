//! Invite Deleter logs: one line per message, no timestamps or message ids.
//!
//! ```text
//! [gid-cid-uid] name#1234: content
//! ```

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{Grammar, compile, required};
use crate::extract::RawFields;
use crate::reassemble::Reassembly;

static RECORD: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"^\[(?P<gid>\d{15,20})-(?P<cid>\d{15,20})-(?P<uid>\d{15,20})\] (?P<uname>.*?)#(?P<disc>\d{4}): (?P<content>[\s\S]*)$",
    )
});

static RECORD_START: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^\[\d{15,20}-\d{15,20}-\d{15,20}\] .*?#\d{4}: "));

pub struct InviteDeleter;

pub struct InviteDeleterRecord {
    guild_id: String,
    channel_id: String,
    user_id: String,
    username: String,
    discriminator: String,
    content: String,
}

impl Grammar for InviteDeleter {
    type Record = InviteDeleterRecord;

    const REASSEMBLY: Reassembly = Reassembly::Split { delimiter: "\n" };

    fn record_pattern() -> &'static Regex {
        &RECORD
    }

    fn record_start() -> &'static Regex {
        &RECORD_START
    }

    fn record(caps: &Captures<'_>) -> Option<InviteDeleterRecord> {
        Some(InviteDeleterRecord {
            guild_id: required(caps, "gid")?,
            channel_id: required(caps, "cid")?,
            user_id: required(caps, "uid")?,
            username: required(caps, "uname")?,
            discriminator: required(caps, "disc")?,
            content: required(caps, "content")?,
        })
    }
}

impl From<InviteDeleterRecord> for RawFields {
    fn from(r: InviteDeleterRecord) -> Self {
        Self {
            channel_id: Some(r.channel_id),
            guild_id: Some(r.guild_id),
            user_id: Some(r.user_id),
            username: Some(r.username),
            discriminator: Some(r.discriminator),
            content: r.content,
            ..Self::default()
        }
    }
}
