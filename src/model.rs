//! The normalized log model every parser produces.
//!
//! All types are plain values: built once per parse, serializable with
//! [`serde`], and safe to share across threads.

use std::fmt;
use std::sync::LazyLock;

use jiff::Timestamp;
use jiff::tz::TimeZone;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::registry::LogType;

/// Body shown for a message with no content, attachments, or embeds.
pub const NO_CONTENT: &str = "[No Message Content]";

/// Body shown for a record whose fields could not be normalized.
pub const MALFORMED: &str = "[Malformed Message]";

/// Default embed accent colour (`#4F545C`).
pub const DEFAULT_EMBED_COLOR: u32 = 0x4F_54_5C;

/// Messages per page when chunking a log for storage.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Gap after which consecutive messages by one author start a new group.
const GROUP_GAP_SECONDS: i64 = 7 * 60;

static ATTACHMENT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^https?://(?:images-ext-\d|cdn|media)\.discordapp\.(?:com|net)/(?:attachments(?:/\d{15,20}){2}|external/[^/]+)/(?P<filename>.+)$",
    )
    .expect("attachment url pattern is valid")
});

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webm", "webp", "mp4"];

/// The result of parsing one log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLog {
    pub log_type: LogType,
    /// The input text exactly as received.
    pub raw_content: String,
    /// Messages in chronological order.
    pub messages: Vec<Message>,
    /// Distinct authors, sorted by username.
    pub users: Vec<User>,
}

/// A single chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Option<u64>,
    pub channel_id: Option<u64>,
    pub guild_id: Option<u64>,
    pub timestamp: Option<Timestamp>,
    pub author: User,
    /// Message text as it appeared in the log.
    pub raw_content: String,
    /// Rendered HTML body.
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub embeds: Vec<Embed>,
    pub edited: bool,
    /// Set when `content` is a placeholder ([`NO_CONTENT`] or [`MALFORMED`]).
    pub error: bool,
}

/// A message author.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct User {
    /// Snowflake id as text, absent for formats that never log ids.
    pub id: Option<String>,
    pub username: String,
    pub discriminator: String,
    pub avatar_url: String,
    #[serde(default)]
    pub bot: bool,
}

impl User {
    /// The key two records must share to be the same author.
    pub fn identity_key(&self) -> String {
        match &self.id {
            Some(id) => id.clone(),
            None => format!("{}#{}", self.username, self.discriminator),
        }
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.username, self.discriminator)
    }
}

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    pub url: String,
    /// Size in bytes; zero when the log does not record it.
    pub size: u64,
    pub is_image: bool,
}

impl Attachment {
    /// Build attachment metadata from a bare URL.
    ///
    /// The filename comes from the Discord CDN path when recognized, else the
    /// last path segment.
    pub fn from_url(url: &str) -> Self {
        let url = url.trim();
        let filename = ATTACHMENT_URL
            .captures(url)
            .and_then(|caps| caps.name("filename"))
            .map(|m| m.as_str())
            .unwrap_or_else(|| url.rsplit('/').next().unwrap_or(url))
            .to_string();
        let is_image = has_image_extension(&filename);
        Self {
            filename,
            url: url.to_string(),
            size: 0,
            is_image,
        }
    }

    /// Size for display, e.g. `0 B` or `1.5 KB`.
    pub fn human_size(&self) -> String {
        const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
        if self.size < 1024 {
            return format!("{} B", self.size);
        }
        #[allow(clippy::cast_precision_loss)]
        let mut value = self.size as f64 / 1024.0;
        let mut unit = 0;
        while value >= 1024.0 && unit < UNITS.len() - 1 {
            value /= 1024.0;
            unit += 1;
        }
        format!("{value:.1} {}", UNITS[unit])
    }
}

pub(crate) fn has_image_extension(filename: &str) -> bool {
    filename
        .rsplit_once('.')
        .is_some_and(|(_, ext)| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

/// A rich embed with its text fields already rendered to HTML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: Option<Timestamp>,
    pub color: u32,
    pub author: Option<EmbedAuthor>,
    pub footer: Option<EmbedFooter>,
    pub image: Option<EmbedMedia>,
    pub thumbnail: Option<EmbedMedia>,
    pub video: Option<EmbedMedia>,
    pub provider: Option<EmbedProvider>,
    pub fields: Vec<EmbedField>,
}

impl Embed {
    /// Accent colour as `#RRGGBB`.
    pub fn color_hex(&self) -> String {
        format!("#{:06X}", self.color & 0xFF_FF_FF)
    }

    /// Lay fields out on a 12-column grid the way Discord does.
    ///
    /// Inline fields share a row, up to three per row; a non-inline field
    /// always takes a row of its own.
    pub fn field_rows(&self) -> Vec<Vec<GridField<'_>>> {
        let mut rows: Vec<Vec<&EmbedField>> = Vec::new();
        let mut current: Vec<&EmbedField> = Vec::new();
        for field in &self.fields {
            if !field.inline {
                if !current.is_empty() {
                    rows.push(std::mem::take(&mut current));
                }
                rows.push(vec![field]);
                continue;
            }
            if current.len() == 3 {
                rows.push(std::mem::take(&mut current));
            }
            current.push(field);
        }
        if !current.is_empty() {
            rows.push(current);
        }

        rows.into_iter()
            .map(|row| {
                let columns = grid_columns(row.len());
                row.into_iter()
                    .zip(columns)
                    .map(|(field, column)| GridField { field, column })
                    .collect()
            })
            .collect()
    }
}

fn grid_columns(fields_in_row: usize) -> &'static [&'static str] {
    match fields_in_row {
        1 => &["1 / 13"],
        2 => &["1 / 7", "7 / 13"],
        _ => &["1 / 5", "5 / 9", "9 / 13"],
    }
}

/// An embed field positioned on the presentation grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridField<'a> {
    pub field: &'a EmbedField,
    /// CSS `grid-column` value, e.g. `1 / 7`.
    pub column: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedAuthor {
    pub name: Option<String>,
    pub url: Option<String>,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedFooter {
    pub text: String,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedMedia {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedProvider {
    pub name: Option<String>,
    pub url: Option<String>,
}

/// A run of consecutive messages shown under one author header.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageGroup<'a> {
    pub author: &'a User,
    pub messages: Vec<&'a Message>,
}

/// A fixed-size slice of a log's messages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<'a> {
    pub index: usize,
    pub messages: &'a [Message],
}

/// A log split into pages, as written by `logview parse --pages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagedLog<'a> {
    pub log_type: LogType,
    pub users: &'a [User],
    pub pages: Vec<Page<'a>>,
}

impl ParsedLog {
    /// Group consecutive messages for display.
    ///
    /// A group ends when the author changes, when more than seven minutes
    /// pass between messages, or when the UTC calendar day changes.
    pub fn message_groups(&self) -> Vec<MessageGroup<'_>> {
        let mut groups: Vec<MessageGroup<'_>> = Vec::new();
        let mut previous: Option<&Message> = None;
        for message in &self.messages {
            let continues = previous.is_some_and(|prev| same_group(prev, message));
            match groups.last_mut() {
                Some(group) if continues => group.messages.push(message),
                _ => groups.push(MessageGroup {
                    author: &message.author,
                    messages: vec![message],
                }),
            }
            previous = Some(message);
        }
        groups
    }

    /// Chunk messages into pages of `page_size` (at least one page).
    pub fn pages(&self, page_size: usize) -> Vec<Page<'_>> {
        if self.messages.is_empty() {
            return vec![Page {
                index: 0,
                messages: &[],
            }];
        }
        self.messages
            .chunks(page_size.max(1))
            .enumerate()
            .map(|(index, messages)| Page { index, messages })
            .collect()
    }

    /// The log with its messages split into pages.
    pub fn paged(&self, page_size: usize) -> PagedLog<'_> {
        PagedLog {
            log_type: self.log_type,
            users: &self.users,
            pages: self.pages(page_size),
        }
    }
}

fn same_group(prev: &Message, next: &Message) -> bool {
    if prev.author.identity_key() != next.author.identity_key() {
        return false;
    }
    match (prev.timestamp, next.timestamp) {
        (Some(a), Some(b)) => {
            let gap = (b.as_second() - a.as_second()).abs();
            gap <= GROUP_GAP_SECONDS && utc_day(a) == utc_day(b)
        }
        _ => true,
    }
}

fn utc_day(ts: Timestamp) -> jiff::civil::Date {
    ts.to_zoned(TimeZone::UTC).date()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str) -> User {
        User {
            id: Some(id.to_string()),
            username: name.to_string(),
            discriminator: "0001".to_string(),
            avatar_url: String::new(),
            bot: false,
        }
    }

    fn message(author: &User, at: &str) -> Message {
        Message {
            id: None,
            channel_id: None,
            guild_id: None,
            timestamp: Some(at.parse().unwrap()),
            author: author.clone(),
            raw_content: "hi".to_string(),
            content: "hi".to_string(),
            attachments: Vec::new(),
            embeds: Vec::new(),
            edited: false,
            error: false,
        }
    }

    fn log(messages: Vec<Message>) -> ParsedLog {
        ParsedLog {
            log_type: LogType::Rowboat,
            raw_content: String::new(),
            messages,
            users: Vec::new(),
        }
    }

    fn field(name: &str, inline: bool) -> EmbedField {
        EmbedField {
            name: name.to_string(),
            value: String::new(),
            inline,
        }
    }

    fn embed(fields: Vec<EmbedField>) -> Embed {
        Embed {
            title: None,
            description: None,
            url: None,
            kind: "rich".to_string(),
            timestamp: None,
            color: DEFAULT_EMBED_COLOR,
            author: None,
            footer: None,
            image: None,
            thumbnail: None,
            video: None,
            provider: None,
            fields,
        }
    }

    #[test]
    fn test_attachment_filename_from_cdn_path() {
        let a = Attachment::from_url(
            "https://cdn.discordapp.com/attachments/532000000000000100/532000000000000003/cat.png",
        );
        assert_eq!(a.filename, "cat.png");
        assert!(a.is_image);
        assert_eq!(a.size, 0);
    }

    #[test]
    fn test_attachment_filename_from_last_segment() {
        let a = Attachment::from_url("https://example.com/files/report.pdf");
        assert_eq!(a.filename, "report.pdf");
        assert!(!a.is_image);
    }

    #[test]
    fn test_attachment_image_extension_case_insensitive() {
        assert!(Attachment::from_url("https://example.com/A.JPG").is_image);
        assert!(Attachment::from_url("https://example.com/clip.mp4").is_image);
        assert!(!Attachment::from_url("https://example.com/noext").is_image);
    }

    #[test]
    fn test_human_size() {
        let mut a = Attachment::from_url("https://example.com/a.txt");
        assert_eq!(a.human_size(), "0 B");
        a.size = 1536;
        assert_eq!(a.human_size(), "1.5 KB");
        a.size = 3 * 1024 * 1024;
        assert_eq!(a.human_size(), "3.0 MB");
    }

    #[test]
    fn test_identity_key_prefers_id() {
        let mut u = user("42", "alice");
        assert_eq!(u.identity_key(), "42");
        u.id = None;
        assert_eq!(u.identity_key(), "alice#0001");
        assert_eq!(u.to_string(), "alice#0001");
    }

    #[test]
    fn test_color_hex() {
        let mut e = embed(Vec::new());
        assert_eq!(e.color_hex(), "#4F545C");
        e.color = 0xFF;
        assert_eq!(e.color_hex(), "#0000FF");
    }

    #[test]
    fn test_field_rows_inline_grouping() {
        let e = embed(vec![
            field("a", true),
            field("b", true),
            field("c", true),
            field("d", true),
            field("e", false),
            field("f", true),
            field("g", true),
        ]);
        let rows = e.field_rows();
        let shape: Vec<Vec<(&str, &str)>> = rows
            .iter()
            .map(|row| row.iter().map(|g| (g.field.name.as_str(), g.column)).collect())
            .collect();
        assert_eq!(
            shape,
            vec![
                vec![("a", "1 / 5"), ("b", "5 / 9"), ("c", "9 / 13")],
                vec![("d", "1 / 13")],
                vec![("e", "1 / 13")],
                vec![("f", "1 / 7"), ("g", "7 / 13")],
            ]
        );
    }

    #[test]
    fn test_message_groups_split_on_author_gap_and_day() {
        let alice = user("1", "alice");
        let bob = user("2", "bob");
        let parsed = log(vec![
            message(&alice, "2019-01-07T12:00:00Z"),
            message(&alice, "2019-01-07T12:05:00Z"),
            message(&bob, "2019-01-07T12:06:00Z"),
            message(&bob, "2019-01-07T12:20:00Z"),
            message(&bob, "2019-01-07T23:59:00Z"),
            message(&bob, "2019-01-08T00:01:00Z"),
        ]);
        let sizes: Vec<usize> = parsed
            .message_groups()
            .iter()
            .map(|g| g.messages.len())
            .collect();
        assert_eq!(sizes, vec![2, 1, 1, 1, 1]);
        assert_eq!(parsed.message_groups()[0].author.username, "alice");
    }

    #[test]
    fn test_pages() {
        let alice = user("1", "alice");
        let parsed = log((0..5).map(|_| message(&alice, "2019-01-07T12:00:00Z")).collect());
        let pages = parsed.pages(2);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[2].index, 2);
        assert_eq!(pages[2].messages.len(), 1);
    }

    #[test]
    fn test_empty_log_has_one_empty_page() {
        let log = log(Vec::new());
        let pages = log.pages(DEFAULT_PAGE_SIZE);
        assert_eq!(pages.len(), 1);
        assert!(pages[0].messages.is_empty());
    }
}
