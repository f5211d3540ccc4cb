//! One grammar per logging bot.
//!
//! Each grammar owns its record pattern, a typed record struct holding the
//! captures it guarantees, and the conversion of that record into
//! [`RawFields`]. The registry dispatches to them statically.

use std::borrow::Cow;

use regex::{Captures, Regex};

use crate::extract::RawFields;
use crate::reassemble::Reassembly;

mod auttaja;
mod capnbot;
mod gearbot;
mod giraffeduck;
mod invite_deleter;
mod logger;
mod modmailbot;
mod rosalina;
mod rowboat;
mod sajuukbot;
mod vortex;

pub use auttaja::Auttaja;
pub use capnbot::CapnBot;
pub use gearbot::GearBot;
pub use giraffeduck::GiraffeDuck;
pub use invite_deleter::InviteDeleter;
pub use logger::Logger;
pub use modmailbot::ModMailBot;
pub use rosalina::RosalinaBottings;
pub use rowboat::Rowboat;
pub use sajuukbot::SajuukBot;
pub use vortex::Vortex;

/// A log grammar: how to find records and what they contain.
pub trait Grammar {
    /// The fields one record is guaranteed to carry.
    type Record: Into<RawFields>;

    const REASSEMBLY: Reassembly;

    /// The record pattern. Whole-text grammars compile it multi-line; split
    /// grammars anchor it to a single block.
    fn record_pattern() -> &'static Regex;

    /// Test for a piece that opens a new record (split grammars only).
    fn record_start() -> &'static Regex {
        Self::record_pattern()
    }

    /// Strip headers or trailers before the grammar runs.
    fn preprocess(text: &str) -> Cow<'_, str> {
        Cow::Borrowed(text)
    }

    /// Pull a typed record out of one match; `None` skips the match.
    fn record(caps: &Captures<'_>) -> Option<Self::Record>;

    /// Post-process all records with access to the preprocessed text.
    fn finish(_text: &str, records: Vec<RawFields>) -> Vec<RawFields> {
        records
    }
}

/// Compile a grammar pattern literal.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("grammar pattern is valid")
}

/// A required capture group.
fn required(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name).map(|m| m.as_str().to_string())
}

/// An optional capture group; empty matches count as absent.
fn optional(caps: &Captures<'_>, name: &str) -> Option<String> {
    caps.name(name)
        .map(|m| m.as_str())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Avatar URL shapes logged by bots that record the author's avatar.
macro_rules! avatar_url {
    () => {
        r"https://(?:cdn\.)?discord(?:app)?\.com/(?:avatars/\d{15,20}|assets|embed/avatars)/\w+\.\w{3,4}(?:\?[\w=]+)?"
    };
}
use avatar_url;
