//! Discord API message JSON as an input format.
//!
//! The input is an array of message objects as returned by the Discord API
//! (or exported by tools that mirror it). It skips the text grammars but is
//! normalized, formatted and sorted like any other log.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::LogviewError;
use crate::extract::RawTimestamp;
use crate::model::{Attachment, has_image_extension};
use crate::normalize::{Draft, parse_snowflake, parse_timestamp};
use crate::timestamp::TimeFormat;
use crate::users::{AuthorRecord, UserResolver};

/// Ids arrive as strings from the API, as numbers from some exporters.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Snowflake {
    Number(u64),
    Text(String),
}

impl Snowflake {
    fn text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DiscordMessage {
    id: Snowflake,
    channel_id: Option<Snowflake>,
    guild_id: Option<Snowflake>,
    author: DiscordUser,
    #[serde(default)]
    content: String,
    timestamp: Option<String>,
    edited_timestamp: Option<String>,
    #[serde(default)]
    attachments: Vec<DiscordAttachment>,
    #[serde(default)]
    embeds: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: Snowflake,
    username: String,
    discriminator: Option<String>,
    avatar: Option<String>,
    #[serde(default)]
    bot: bool,
}

#[derive(Debug, Deserialize)]
struct DiscordAttachment {
    filename: Option<String>,
    url: String,
    #[serde(default)]
    size: u64,
    width: Option<u32>,
    height: Option<u32>,
    content_type: Option<String>,
}

impl DiscordAttachment {
    fn into_attachment(self) -> Attachment {
        let from_url = Attachment::from_url(&self.url);
        let filename = self.filename.unwrap_or(from_url.filename);
        let is_image = match self.content_type.as_deref() {
            Some(kind) => kind.starts_with("image/") || kind.starts_with("video/"),
            None => (self.width.is_some() && self.height.is_some()) || has_image_extension(&filename),
        };
        Attachment {
            filename,
            url: self.url,
            size: self.size,
            is_image,
        }
    }
}

/// Read a message array into drafts.
///
/// A document that is not an array is an error; an element that is not a
/// readable message becomes a placeholder.
pub(crate) fn drafts(text: &str, users: &mut UserResolver<'_>) -> Result<Vec<Draft>, LogviewError> {
    let values: Vec<Value> = serde_json::from_str(text)?;
    debug!(objects = values.len(), "read discord message array");
    Ok(values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let id = value.get("id").and_then(id_of);
            match serde_json::from_value::<DiscordMessage>(value) {
                Ok(message) => draft(message, users),
                Err(err) => {
                    warn!(index, %err, "unreadable discord message");
                    Draft::placeholder(id, users.resolve(AuthorRecord::default()))
                }
            }
        })
        .collect())
}

fn id_of(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn draft(message: DiscordMessage, users: &mut UserResolver<'_>) -> Draft {
    let mut malformed = false;
    let id = parse_snowflake(Some(&message.id.text()), "message id", &mut malformed);
    let channel_id = parse_snowflake(
        message.channel_id.as_ref().map(Snowflake::text).as_deref(),
        "channel id",
        &mut malformed,
    );
    let guild_id = parse_snowflake(
        message.guild_id.as_ref().map(Snowflake::text).as_deref(),
        "guild id",
        &mut malformed,
    );
    let raw_timestamp = message
        .timestamp
        .map(|text| RawTimestamp::new(text, TimeFormat::Rfc3339));
    let timestamp = parse_timestamp(raw_timestamp.as_ref(), id, &mut malformed);

    let user_id = message.author.id.text();
    let author = users.resolve(AuthorRecord {
        id: Some(&user_id),
        username: Some(&message.author.username),
        discriminator: message.author.discriminator.as_deref(),
        avatar: message.author.avatar.as_deref(),
        bot: message.author.bot,
    });

    Draft {
        id,
        channel_id,
        guild_id,
        timestamp,
        author,
        raw_content: message.content,
        attachments: message
            .attachments
            .into_iter()
            .map(DiscordAttachment::into_attachment)
            .collect(),
        embeds: message.embeds,
        edited: message.edited_timestamp.is_some(),
        malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::FormatOptions;
    use crate::model::{MALFORMED, Message};

    const MESSAGES: &str = r#"[
        {
            "id": "532000000000000002",
            "channel_id": "532000000000000200",
            "author": {"id": "132000000000000001", "username": "alice", "discriminator": "1234", "avatar": "a_abc", "bot": false},
            "content": "hi <@132000000000000002>",
            "timestamp": "2019-01-07T12:35:00.000000+00:00",
            "edited_timestamp": "2019-01-07T12:36:00.000000+00:00",
            "attachments": [{"filename": "log.txt", "url": "https://cdn.discordapp.com/attachments/1/2/log.txt", "size": 2048, "content_type": "text/plain"}],
            "embeds": []
        },
        {
            "id": 532000000000000001,
            "author": {"id": 132000000000000002, "username": "bob", "discriminator": "0042", "avatar": null, "bot": true},
            "content": "first",
            "timestamp": "2019-01-07T12:34:00+00:00",
            "edited_timestamp": null,
            "attachments": [{"url": "https://example.com/pic", "width": 10, "height": 20}]
        },
        {"content": "no author or id"}
    ]"#;

    fn parse(text: &str) -> Vec<Message> {
        let mut users = UserResolver::new(None);
        let drafts = drafts(text, &mut users).unwrap();
        let users = users.into_users();
        drafts
            .into_iter()
            .map(|d| d.render(&users, FormatOptions::MESSAGE))
            .collect()
    }

    #[test]
    fn test_messages() {
        let messages = parse(MESSAGES);
        assert_eq!(messages.len(), 3);

        let alice = &messages[0];
        assert_eq!(alice.id, Some(532_000_000_000_000_002));
        assert_eq!(alice.channel_id, Some(532_000_000_000_000_200));
        assert!(alice.edited);
        assert_eq!(
            alice.author.avatar_url,
            "https://cdn.discordapp.com/avatars/132000000000000001/a_abc.gif"
        );
        assert!(alice.content.contains("@bob"));
        assert_eq!(alice.attachments[0].size, 2048);
        assert!(!alice.attachments[0].is_image);

        let bob = &messages[1];
        assert_eq!(bob.id, Some(532_000_000_000_000_001));
        assert!(bob.author.bot);
        assert!(!bob.edited);
        assert_eq!(bob.attachments[0].filename, "pic");
        assert!(bob.attachments[0].is_image);
    }

    #[test]
    fn test_unreadable_object_is_placeholder() {
        let messages = parse(MESSAGES);
        assert!(messages[2].error);
        assert_eq!(messages[2].content, MALFORMED);
    }

    #[test]
    fn test_not_an_array() {
        let mut users = UserResolver::new(None);
        let err = drafts(r#"{"id": "1"}"#, &mut users).unwrap_err();
        assert!(matches!(err, LogviewError::InvalidJson(_)));
    }
}
