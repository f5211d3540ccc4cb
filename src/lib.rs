//! `logview`: Discord logging-bot output to styled HTML transcripts.
//!
//! This library parses the text logs a dozen Discord moderation and logging
//! bots produce (or raw Discord message JSON) into one canonical
//! [`ParsedLog`], and renders Discord-flavored markdown to HTML.
//!
//! # Example
//!
//! ```
//! use logview::{FormatOptions, LogType, format, parse};
//!
//! let log = "2019-01-07 12:34:56.000000 (532000000000000001 / 532000000000000100 / 132000000000000001) alice#1234: **hi** ()";
//! let parsed = parse(LogType::Rowboat, log).unwrap();
//! assert_eq!(parsed.messages[0].content, "<b>hi</b>");
//! assert_eq!(parsed.users[0].username, "alice");
//!
//! let html = format("`code` and __underline__", &parsed.users, FormatOptions::MESSAGE);
//! assert!(html.contains("<u>underline</u>"));
//! ```

pub mod cli;
pub mod config;
mod discord;
mod embed;
pub mod error;
mod extract;
pub mod formatter;
mod grammars;
mod literal;
pub mod model;
mod normalize;
pub mod parser;
pub mod reassemble;
pub mod registry;
mod sort;
pub mod timestamp;
pub mod users;

// Re-export primary API types for convenience.
pub use config::Config;
pub use error::LogviewError;
pub use formatter::{EmbedMode, FormatOptions, format};
pub use model::{Attachment, Embed, EmbedField, Message, MessageGroup, Page, PagedLog, ParsedLog, User};
pub use parser::{LogParser, ProgressReporter};
pub use registry::LogType;
pub use users::{ResolveError, UserAvatarResolver};

/// Parse a log of the given type.
pub fn parse(log_type: LogType, text: &str) -> Result<ParsedLog, LogviewError> {
    LogParser::new(log_type).parse(text)
}

/// Parse a log given as raw bytes; non-UTF-8 input is an error.
pub fn parse_bytes(log_type: LogType, bytes: &[u8]) -> Result<ParsedLog, LogviewError> {
    LogParser::new(log_type).parse_bytes(bytes)
}

/// Parse a JSON array of Discord API message objects.
pub fn parse_json(text: &str) -> Result<ParsedLog, LogviewError> {
    LogParser::new(LogType::DiscordJson).parse(text)
}
