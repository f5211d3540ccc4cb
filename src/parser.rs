//! The parse pipeline: raw log text to a [`ParsedLog`].
//!
//! Text logs run through their grammar's reassembly and extraction, then
//! every record is normalized, formatted and sorted. Discord JSON skips the
//! grammar stage. Only whole-log failures are errors; bad records become
//! placeholder messages.

use tracing::{debug, info};

use crate::discord;
use crate::error::LogviewError;
use crate::formatter::FormatOptions;
use crate::model::ParsedLog;
use crate::normalize::Draft;
use crate::registry::LogType;
use crate::sort::sort_chronologically;
use crate::users::{UserAvatarResolver, UserResolver};

/// Observes parse progress.
///
/// Called once after extraction with `current == 0`, then after each message
/// is formatted. Implementations must not block for long.
pub trait ProgressReporter {
    fn report(&self, current: usize, total: usize);
}

impl ProgressReporter for () {
    fn report(&self, _current: usize, _total: usize) {}
}

impl<F> ProgressReporter for F
where
    F: Fn(usize, usize),
{
    fn report(&self, current: usize, total: usize) {
        self(current, total);
    }
}

/// Configurable parser for one log type.
///
/// ```
/// use logview::{LogParser, LogType};
///
/// let log = "2019-01-07 12:34:56.000000 (532000000000000100 / 532000000000000200 / 132000000000000001) alice#1234: hello ()";
/// let parsed = LogParser::new(LogType::Rowboat).parse(log).unwrap();
/// assert_eq!(parsed.messages.len(), 1);
/// assert_eq!(parsed.messages[0].content, "hello");
/// ```
#[derive(Clone, Copy)]
pub struct LogParser<'a> {
    log_type: LogType,
    progress: &'a dyn ProgressReporter,
    avatars: Option<&'a dyn UserAvatarResolver>,
    options: FormatOptions,
}

impl<'a> LogParser<'a> {
    pub fn new(log_type: LogType) -> Self {
        Self {
            log_type,
            progress: &(),
            avatars: None,
            options: FormatOptions::MESSAGE,
        }
    }

    #[must_use]
    pub fn progress(mut self, progress: &'a dyn ProgressReporter) -> Self {
        self.progress = progress;
        self
    }

    #[must_use]
    pub fn avatar_resolver(mut self, avatars: &'a dyn UserAvatarResolver) -> Self {
        self.avatars = Some(avatars);
        self
    }

    /// Options used for message bodies. Embeds always use their own.
    #[must_use]
    pub fn format_options(mut self, options: FormatOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse raw bytes, which must be UTF-8.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<ParsedLog, LogviewError> {
        let text = std::str::from_utf8(bytes)?;
        self.parse(text)
    }

    /// Parse a whole log.
    ///
    /// # Errors
    ///
    /// [`LogviewError::UnrecognizedFormat`] when non-empty text yields no
    /// records, [`LogviewError::InvalidJson`] when Discord JSON input is not
    /// a JSON array.
    pub fn parse(&self, text: &str) -> Result<ParsedLog, LogviewError> {
        let normalized = text.replace("\r\n", "\n");
        let mut users = UserResolver::new(self.avatars);

        let drafts: Vec<Draft> = if normalized.trim().is_empty() {
            Vec::new()
        } else {
            match self.log_type.format() {
                None => discord::drafts(&normalized, &mut users)?,
                Some(format) => {
                    let records = format.extract(&normalized);
                    if records.is_empty() {
                        return Err(LogviewError::UnrecognizedFormat {
                            log_type: self.log_type,
                        });
                    }
                    records
                        .into_iter()
                        .map(|record| Draft::from_raw(record, &mut users))
                        .collect()
                }
            }
        };

        let users = users.into_users();
        let total = drafts.len();
        debug!(records = total, users = users.len(), "normalized records");
        self.progress.report(0, total);

        let mut messages = Vec::with_capacity(total);
        for (index, draft) in drafts.into_iter().enumerate() {
            messages.push(draft.render(&users, self.options));
            self.progress.report(index + 1, total);
        }
        let messages = sort_chronologically(messages);

        let errors = messages.iter().filter(|m| m.error).count();
        info!(
            log_type = self.log_type.tag(),
            messages = messages.len(),
            users = users.len(),
            errors,
            "parsed log"
        );
        Ok(ParsedLog {
            log_type: self.log_type,
            raw_content: text.to_string(),
            messages,
            users,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const ROWBOAT: &str = concat!(
        "2019-01-07 12:35:00.000000 (532000000000000002 / 532000000000000200 / 132000000000000002) bob#0042: second <@132000000000000001> ()\r\n",
        "2019-01-07 12:34:56.000000 (532000000000000001 / 532000000000000200 / 132000000000000001) alice#1234: first ()\r\n",
    );

    #[test]
    fn test_parse_sorts_and_dedups() {
        let log = LogParser::new(LogType::Rowboat).parse(ROWBOAT).unwrap();
        assert_eq!(log.messages.len(), 2);
        assert_eq!(log.messages[0].raw_content, "first");
        assert_eq!(log.users.len(), 2);
        assert_eq!(log.users[0].username, "alice");
        assert!(log.messages[1].content.contains("@alice"));
        assert_eq!(log.raw_content, ROWBOAT);
    }

    #[test]
    fn test_unrecognized_format() {
        let err = LogParser::new(LogType::Vortex)
            .parse("this is not a vortex log")
            .unwrap_err();
        assert!(matches!(
            err,
            LogviewError::UnrecognizedFormat {
                log_type: LogType::Vortex
            }
        ));
    }

    #[test]
    fn test_empty_input_is_empty_log() {
        let log = LogParser::new(LogType::Rowboat).parse("  \n").unwrap();
        assert!(log.messages.is_empty());
        assert!(log.users.is_empty());
    }

    #[test]
    fn test_invalid_utf8() {
        let err = LogParser::new(LogType::Rowboat)
            .parse_bytes(&[0x66, 0xFF, 0x66])
            .unwrap_err();
        assert!(matches!(err, LogviewError::Encoding(_)));
    }

    #[test]
    fn test_progress_reported() {
        let calls = RefCell::new(Vec::new());
        let progress = |current: usize, total: usize| calls.borrow_mut().push((current, total));
        LogParser::new(LogType::Rowboat)
            .progress(&progress)
            .parse(ROWBOAT)
            .unwrap();
        assert_eq!(*calls.borrow(), vec![(0, 2), (1, 2), (2, 2)]);
    }
}
