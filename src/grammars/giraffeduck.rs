//! GiraffeDuck logs.
//!
//! Five bracketed header lines list the guild, the authors, the mentioned
//! users, channels and roles as `name (id)` pairs. Records carry no user id,
//! so ids come from the author header, and raw mentions in content are
//! rewritten to named forms using the other headers.
//!
//! ```text
//! [2019-01-07 12:34:56] (mid) name#1234 : content | Attach: url | RichEmbed: {...}
//! ```

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::{Grammar, compile, optional, required};
use crate::extract::{RawFields, RawTimestamp, decode_embeds, split_attachments};
use crate::reassemble::Reassembly;
use crate::timestamp::TimeFormat;

const HEADER_LINES: usize = 5;

static RECORD: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"(?m)^\[(?P<time>[\d\- :]{19})\] \((?P<mid>\d{15,20})\) (?P<uname>.*?)#(?P<disc>\d{4}) : (?P<content>[\s\S]*?) \| Attach: (?P<attach>https?:.*)? \| RichEmbed: (?:null|(?P<embeds>.*))$",
    )
});

static HEADER_PAIR: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?P<name>.+?) \((?P<id>\d{15,20})\)(?:; |$)"));

static USER_MENTION: LazyLock<Regex> = LazyLock::new(|| compile(r"<@!?(\d+)>"));
static CHANNEL_MENTION: LazyLock<Regex> = LazyLock::new(|| compile(r"<#(\d+)>"));
static ROLE_MENTION: LazyLock<Regex> = LazyLock::new(|| compile(r"<@&(\d+)>"));

pub struct GiraffeDuck;

pub struct GiraffeDuckRecord {
    time: String,
    message_id: String,
    username: String,
    discriminator: String,
    content: String,
    attachments: Option<String>,
    embeds: Option<String>,
}

impl Grammar for GiraffeDuck {
    type Record = GiraffeDuckRecord;

    const REASSEMBLY: Reassembly = Reassembly::WholeText;

    fn record_pattern() -> &'static Regex {
        &RECORD
    }

    fn record(caps: &Captures<'_>) -> Option<GiraffeDuckRecord> {
        Some(GiraffeDuckRecord {
            time: required(caps, "time")?,
            message_id: required(caps, "mid")?,
            username: required(caps, "uname")?,
            discriminator: required(caps, "disc")?,
            content: required(caps, "content")?,
            attachments: optional(caps, "attach"),
            embeds: optional(caps, "embeds"),
        })
    }

    fn finish(text: &str, mut records: Vec<RawFields>) -> Vec<RawFields> {
        let headers = Headers::parse(text);
        for record in &mut records {
            if let (Some(name), Some(disc)) = (&record.username, &record.discriminator) {
                record.user_id = headers.authors.get(&format!("{name}#{disc}")).cloned();
            }
            record.content = headers.rewrite_mentions(&record.content);
        }
        records
    }
}

impl From<GiraffeDuckRecord> for RawFields {
    fn from(r: GiraffeDuckRecord) -> Self {
        Self {
            message_id: Some(r.message_id),
            username: Some(r.username),
            discriminator: Some(r.discriminator),
            content: r.content,
            timestamp: Some(RawTimestamp::new(r.time, TimeFormat::SpaceSeparated)),
            attachments: split_attachments(r.attachments.as_deref(), ", "),
            embeds: decode_embeds(r.embeds.as_deref()),
            ..Self::default()
        }
    }
}

/// Name/id tables from the log header.
#[derive(Debug, Default)]
struct Headers {
    /// `name#disc` → id
    authors: HashMap<String, String>,
    /// id → `name#disc`
    users: HashMap<String, String>,
    channels: HashMap<String, String>,
    roles: HashMap<String, String>,
}

impl Headers {
    fn parse(text: &str) -> Self {
        let lines: Vec<Vec<(String, String)>> = text
            .lines()
            .take(HEADER_LINES)
            .map(header_pairs)
            .collect();
        let by_id = |index: usize| -> HashMap<String, String> {
            lines
                .get(index)
                .map(|pairs| pairs.iter().map(|(name, id)| (id.clone(), name.clone())).collect())
                .unwrap_or_default()
        };
        Self {
            authors: lines
                .get(1)
                .map(|pairs| pairs.iter().cloned().collect())
                .unwrap_or_default(),
            users: by_id(2),
            channels: by_id(3),
            roles: by_id(4),
        }
    }

    /// Rewrite id mentions whose names are known; unknown ids are kept.
    fn rewrite_mentions(&self, content: &str) -> String {
        let content = USER_MENTION.replace_all(content, |caps: &Captures<'_>| match self.users.get(&caps[1]) {
            Some(name) => format!("<@{name} ({})>", &caps[1]),
            None => caps[0].to_string(),
        });
        let content = CHANNEL_MENTION.replace_all(&content, |caps: &Captures<'_>| match self.channels.get(&caps[1]) {
            Some(name) => format!("<#{name}>"),
            None => caps[0].to_string(),
        });
        ROLE_MENTION
            .replace_all(&content, |caps: &Captures<'_>| match self.roles.get(&caps[1]) {
                Some(name) => format!("<@&{name}>"),
                None => caps[0].to_string(),
            })
            .into_owned()
    }
}

/// `[a (1); b (2)]` → `[("a", "1"), ("b", "2")]`
fn header_pairs(line: &str) -> Vec<(String, String)> {
    let inner = line
        .trim()
        .strip_prefix('[')
        .and_then(|l| l.strip_suffix(']'))
        .unwrap_or("");
    HEADER_PAIR
        .captures_iter(inner)
        .map(|caps| (caps["name"].to_string(), caps["id"].to_string()))
        .collect()
}
