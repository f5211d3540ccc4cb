//! Timestamp parsing for the date formats logging bots write.
//!
//! Every grammar names the [`TimeFormat`] its timestamps use. Formats without
//! a zone are interpreted as UTC. Snowflake ids carry their own creation time,
//! recovered with [`snowflake_timestamp`].

use std::fmt;

use jiff::Timestamp;
use jiff::civil::DateTime;
use jiff::tz::TimeZone;
use thiserror::Error;

/// Milliseconds between the Unix epoch and the Discord epoch (2015-01-01).
pub const DISCORD_EPOCH_MS: i64 = 1_420_070_400_000;

/// The textual timestamp layouts found in supported logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    /// `2019-01-07 12:34:56`, optionally with a fractional second.
    SpaceSeparated,
    /// `2019-01-07T12:34:56.789` with the offset already stripped.
    IsoLocal,
    /// `Mon Jan 07 12:34:56 2019` (C `ctime` layout).
    Ctime,
    /// `Mon Jan 07 2019 12:34:56 GMT+0000` (JavaScript `Date#toString`).
    JsDate,
    /// `Mon, 7 Jan 2019 12:34:56 GMT`.
    Rfc2822,
    /// RFC 3339 as found in Discord API payloads. A missing offset means UTC.
    Rfc3339,
}

impl fmt::Display for TimeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SpaceSeparated => "YYYY-MM-DD HH:MM:SS",
            Self::IsoLocal => "ISO 8601",
            Self::Ctime => "ctime",
            Self::JsDate => "JavaScript date",
            Self::Rfc2822 => "RFC 2822",
            Self::Rfc3339 => "RFC 3339",
        };
        f.write_str(name)
    }
}

/// A timestamp string that does not fit its grammar's layout.
#[derive(Debug, Clone, Error)]
#[error("cannot read {input:?} as a {format} timestamp")]
pub struct TimestampError {
    pub input: String,
    pub format: TimeFormat,
}

impl TimeFormat {
    /// Parse `input` according to this layout.
    pub fn parse(self, input: &str) -> Result<Timestamp, TimestampError> {
        let input = input.trim();
        let parsed = match self {
            Self::SpaceSeparated => civil_strptime(&["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M:%S%.f"], input),
            Self::IsoLocal => input.parse::<DateTime>().ok().and_then(civil_to_utc),
            Self::Ctime => civil_strptime(&["%a %b %d %H:%M:%S %Y", "%a %b %e %H:%M:%S %Y"], input),
            Self::JsDate => Timestamp::strptime("%a %b %d %Y %H:%M:%S GMT%z", input).ok(),
            Self::Rfc2822 => jiff::fmt::rfc2822::parse(input)
                .ok()
                .map(|zoned| zoned.timestamp()),
            Self::Rfc3339 => input
                .parse::<Timestamp>()
                .ok()
                .or_else(|| input.parse::<DateTime>().ok().and_then(civil_to_utc)),
        };
        parsed.ok_or_else(|| TimestampError {
            input: input.to_string(),
            format: self,
        })
    }
}

fn civil_strptime(patterns: &[&str], input: &str) -> Option<Timestamp> {
    patterns
        .iter()
        .find_map(|pattern| DateTime::strptime(pattern, input).ok())
        .and_then(civil_to_utc)
}

fn civil_to_utc(dt: DateTime) -> Option<Timestamp> {
    dt.to_zoned(TimeZone::UTC).ok().map(|zoned| zoned.timestamp())
}

/// Creation time encoded in a Discord snowflake id.
pub fn snowflake_timestamp(id: u64) -> Option<Timestamp> {
    Timestamp::from_millisecond(snowflake_millis(id)).ok()
}

/// Milliseconds since the Unix epoch encoded in a snowflake id.
pub fn snowflake_millis(id: u64) -> i64 {
    // (u64 >> 22) always fits in i64.
    (id >> 22) as i64 + DISCORD_EPOCH_MS
}
