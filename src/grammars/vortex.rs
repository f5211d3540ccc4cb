//! Vortex logs: a header paragraph, then blank-line separated messages with
//! attachment URLs on their own lines.
//!
//! ```text
//! [Mon, 7 Jan 2019 12:34:56 GMT] name#1234 (uid) : content
//! url
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
        r"^\[(?P<time>[\w, :]{28,31})\] (?P<uname>.*?)#(?P<disc>\d{4}) \((?P<uid>\d{15,20})\) : (?P<content>[\s\S]*?)(?P<attach>(?:\nhttps?:.*)*)$",
    )
});

static RECORD_START: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^\[[\w, :]{28,31}\] .*?#\d{4} \(\d{15,20}\) : "));

pub struct Vortex;

pub struct VortexRecord {
    time: String,
    username: String,
    discriminator: String,
    user_id: String,
    content: String,
    attachments: Option<String>,
}

impl Grammar for Vortex {
    type Record = VortexRecord;

    const REASSEMBLY: Reassembly = Reassembly::Split { delimiter: "\n\n" };

    fn record_pattern() -> &'static Regex {
        &RECORD
    }

    fn record_start() -> &'static Regex {
        &RECORD_START
    }

    /// The first paragraph is the export header.
    fn preprocess(text: &str) -> Cow<'_, str> {
        let body = text.split_once("\n\n").map_or("", |(_, rest)| rest);
        Cow::Borrowed(body.strip_suffix('\n').unwrap_or(body))
    }

    fn record(caps: &Captures<'_>) -> Option<VortexRecord> {
        Some(VortexRecord {
            time: required(caps, "time")?,
            username: required(caps, "uname")?,
            discriminator: required(caps, "disc")?,
            user_id: required(caps, "uid")?,
            content: required(caps, "content")?,
            attachments: optional(caps, "attach"),
        })
    }
}

impl From<VortexRecord> for RawFields {
    fn from(r: VortexRecord) -> Self {
        Self {
            user_id: Some(r.user_id),
            username: Some(r.username),
            discriminator: Some(r.discriminator),
            content: r.content,
            timestamp: Some(RawTimestamp::new(r.time, TimeFormat::Rfc2822)),
            attachments: split_attachments(r.attachments.as_deref(), "\n"),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::extract;

    const LOG: &str = "\
Messages in #general

[Mon, 7 Jan 2019 12:34:56 GMT] Alice#1234 (132000000000000001) : Hello

[Mon, 7 Jan 2019 12:35:00 GMT] Bob#0042 (132000000000000002) : two
https://cdn.discordapp.com/attachments/1/2/b.png
https://cdn.discordapp.com/attachments/1/2/c.png

[Mon, 7 Jan 2019 12:36:00 GMT] Alice#1234 (132000000000000001) : bye
";

    #[test]
    fn test_header_skipped() {
        let records = extract::<Vortex>(LOG);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].content, "Hello");
        assert_eq!(records[2].content, "bye");
    }

    #[test]
    fn test_newline_joined_attachments() {
        let records = extract::<Vortex>(LOG);
        assert_eq!(records[1].content, "two");
        assert_eq!(records[1].attachments.len(), 2);
    }

    #[test]
    fn test_header_only() {
        assert!(extract::<Vortex>("Messages in #general\n").is_empty());
    }
}
