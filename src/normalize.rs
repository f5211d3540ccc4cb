//! Raw record fields to canonical messages.
//!
//! Normalization happens in two steps. [`Draft::from_raw`] reads ids,
//! timestamps and the author while the user set is still being built;
//! [`Draft::render`] formats content once every user is known, so mentions
//! can resolve against authors that appear later in the log.

use jiff::Timestamp;
use serde_json::Value;
use tracing::warn;

use crate::embed::render_embeds;
use crate::extract::{RawFields, RawTimestamp};
use crate::formatter::{FormatOptions, format};
use crate::model::{Attachment, MALFORMED, Message, NO_CONTENT, User};
use crate::timestamp::snowflake_timestamp;
use crate::users::{AuthorRecord, UserResolver};

/// A message whose content has not been formatted yet.
#[derive(Debug, Clone)]
pub(crate) struct Draft {
    pub id: Option<u64>,
    pub channel_id: Option<u64>,
    pub guild_id: Option<u64>,
    pub timestamp: Option<Timestamp>,
    pub author: User,
    pub raw_content: String,
    pub attachments: Vec<Attachment>,
    pub embeds: Vec<Value>,
    pub edited: bool,
    /// A required field failed to parse.
    pub malformed: bool,
}

impl Draft {
    pub fn from_raw(raw: RawFields, users: &mut UserResolver<'_>) -> Self {
        let mut malformed = false;
        let id = parse_snowflake(raw.message_id.as_deref(), "message id", &mut malformed);
        let channel_id = parse_snowflake(raw.channel_id.as_deref(), "channel id", &mut malformed);
        let guild_id = parse_snowflake(raw.guild_id.as_deref(), "guild id", &mut malformed);
        let timestamp = parse_timestamp(raw.timestamp.as_ref(), id, &mut malformed);
        let author = users.resolve(AuthorRecord {
            id: raw.user_id.as_deref(),
            username: raw.username.as_deref(),
            discriminator: raw.discriminator.as_deref(),
            avatar: raw.avatar.as_deref(),
            bot: false,
        });
        Self {
            id,
            channel_id,
            guild_id,
            timestamp,
            author,
            raw_content: raw.content,
            attachments: raw.attachments.iter().map(|url| Attachment::from_url(url)).collect(),
            embeds: raw.embeds,
            edited: false,
            malformed,
        }
    }

    /// A stand-in for a record that could not be read at all.
    pub fn placeholder(id: Option<u64>, author: User) -> Self {
        Self {
            id,
            channel_id: None,
            guild_id: None,
            timestamp: id.and_then(snowflake_timestamp),
            author,
            raw_content: String::new(),
            attachments: Vec::new(),
            embeds: Vec::new(),
            edited: false,
            malformed: true,
        }
    }

    /// Format content and embeds against the final user set.
    pub fn render(self, users: &[User], options: FormatOptions) -> Message {
        let embeds = if self.malformed {
            Vec::new()
        } else {
            render_embeds(self.embeds, users)
        };
        let empty = self.raw_content.trim().is_empty() && self.attachments.is_empty() && embeds.is_empty();
        let (content, error) = if self.malformed {
            (MALFORMED.to_string(), true)
        } else if empty {
            (NO_CONTENT.to_string(), true)
        } else {
            (format(&self.raw_content, users, options), false)
        };
        Message {
            id: self.id,
            channel_id: self.channel_id,
            guild_id: self.guild_id,
            timestamp: self.timestamp,
            author: self.author,
            raw_content: self.raw_content,
            content,
            attachments: self.attachments,
            embeds,
            edited: self.edited,
            error,
        }
    }
}

/// Parse an optional snowflake; text that is not one marks the record
/// malformed.
pub(crate) fn parse_snowflake(text: Option<&str>, field: &str, malformed: &mut bool) -> Option<u64> {
    let text = text.map(str::trim).filter(|t| !t.is_empty())?;
    match text.parse::<u64>() {
        Ok(0) => None,
        Ok(id) => Some(id),
        Err(err) => {
            warn!(field, text, %err, "unreadable snowflake");
            *malformed = true;
            None
        }
    }
}

/// A record's timestamp, else the creation time in its message id.
pub(crate) fn parse_timestamp(raw: Option<&RawTimestamp>, id: Option<u64>, malformed: &mut bool) -> Option<Timestamp> {
    match raw {
        Some(raw) => match raw.format.parse(&raw.text) {
            Ok(ts) => Some(ts),
            Err(err) => {
                warn!(%err, "malformed record");
                *malformed = true;
                id.and_then(snowflake_timestamp)
            }
        },
        None => id.and_then(snowflake_timestamp),
    }
}
