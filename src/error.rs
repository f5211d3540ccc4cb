//! Error types for `logview`.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Only log-level failures
//! are errors: a record that cannot be read is recovered as a placeholder
//! message instead (see [`Message::error`](crate::model::Message::error)).

use thiserror::Error;

use crate::registry::LogType;

/// Errors that abort a whole parse or a CLI run.
///
/// Maps to exit codes: [`Config`](Self::Config) / [`Toml`](Self::Toml) /
/// [`UnknownLogType`](Self::UnknownLogType) → exit 1, [`Io`](Self::Io) /
/// [`Output`](Self::Output) → exit 2,
/// everything else → exit 3.
#[derive(Debug, Error)]
pub enum LogviewError {
    /// The grammar for `log_type` found no records in non-empty input.
    #[error("no {log_type} records found in input")]
    UnrecognizedFormat { log_type: LogType },

    /// Input bytes are not valid UTF-8.
    #[error("input is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// Discord JSON input is not a JSON array.
    #[error("invalid Discord message JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A log-type tag that no grammar is registered for.
    #[error("unknown log type '{0}'")]
    UnknownLogType(String),

    /// Configuration error (invalid flag combination, unreadable config file).
    #[error("configuration error: {0}")]
    Config(String),

    /// Output could not be serialized as JSON.
    #[error("cannot write JSON output: {0}")]
    Output(serde_json::Error),

    /// I/O error during read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML deserialization error.
    #[error("config file error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl LogviewError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Toml(_) | Self::UnknownLogType(_) => 1,
            Self::Io(_) | Self::Output(_) => 2,
            Self::UnrecognizedFormat { .. } | Self::Encoding(_) | Self::InvalidJson(_) => 3,
        }
    }
}
