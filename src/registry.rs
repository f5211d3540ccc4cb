//! Log-type tags and the grammar each one selects.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::LogviewError;
use crate::extract::{RawFields, extract};
use crate::grammars::{
    Auttaja, CapnBot, GearBot, GiraffeDuck, Grammar, InviteDeleter, Logger, ModMailBot,
    RosalinaBottings, Rowboat, SajuukBot, Vortex,
};
use crate::reassemble::Reassembly;

/// Every log source `logview` understands.
///
/// The Rowboat-derived bots write identical logs and share one grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogType {
    Auttaja,
    #[serde(rename = "capnbot")]
    CapnBot,
    #[serde(rename = "gearbot")]
    GearBot,
    #[serde(rename = "giraffeduck")]
    GiraffeDuck,
    InviteDeleter,
    Logger,
    #[serde(rename = "modmailbot")]
    ModMailBot,
    RosalinaBottings,
    Rowboat,
    Aperture,
    #[serde(rename = "flygbat")]
    FlygBat,
    Heimdallr,
    Jetski,
    LmgShowboat,
    #[serde(rename = "rawgoat")]
    RawGoat,
    Speedboat,
    #[serde(rename = "sajuukbot")]
    SajuukBot,
    Vortex,
    /// A JSON array of Discord API message objects.
    DiscordJson,
}

/// The grammar families behind the log types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Auttaja,
    CapnBot,
    GearBot,
    GiraffeDuck,
    InviteDeleter,
    Logger,
    ModMailBot,
    RosalinaBottings,
    Rowboat,
    SajuukBot,
    Vortex,
}

impl LogType {
    pub const ALL: [Self; 19] = [
        Self::Auttaja,
        Self::CapnBot,
        Self::GearBot,
        Self::GiraffeDuck,
        Self::InviteDeleter,
        Self::Logger,
        Self::ModMailBot,
        Self::RosalinaBottings,
        Self::Rowboat,
        Self::Aperture,
        Self::FlygBat,
        Self::Heimdallr,
        Self::Jetski,
        Self::LmgShowboat,
        Self::RawGoat,
        Self::Speedboat,
        Self::SajuukBot,
        Self::Vortex,
        Self::DiscordJson,
    ];

    /// The stable snake_case tag used in config files and on the command line.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Auttaja => "auttaja",
            Self::CapnBot => "capnbot",
            Self::GearBot => "gearbot",
            Self::GiraffeDuck => "giraffeduck",
            Self::InviteDeleter => "invite_deleter",
            Self::Logger => "logger",
            Self::ModMailBot => "modmailbot",
            Self::RosalinaBottings => "rosalina_bottings",
            Self::Rowboat => "rowboat",
            Self::Aperture => "aperture",
            Self::FlygBat => "flygbat",
            Self::Heimdallr => "heimdallr",
            Self::Jetski => "jetski",
            Self::LmgShowboat => "lmg_showboat",
            Self::RawGoat => "rawgoat",
            Self::Speedboat => "speedboat",
            Self::SajuukBot => "sajuukbot",
            Self::Vortex => "vortex",
            Self::DiscordJson => "discord_json",
        }
    }

    /// Human-readable bot name.
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Auttaja => "Auttaja",
            Self::CapnBot => "CapnBot",
            Self::GearBot => "GearBot",
            Self::GiraffeDuck => "GiraffeDuck",
            Self::InviteDeleter => "Invite Deleter",
            Self::Logger => "Logger",
            Self::ModMailBot => "ModMailBot",
            Self::RosalinaBottings => "Rosalina Bottings",
            Self::Rowboat => "Rowboat",
            Self::Aperture => "Aperture",
            Self::FlygBat => "Flygbåt",
            Self::Heimdallr => "Heimdallr",
            Self::Jetski => "Jetski",
            Self::LmgShowboat => "LMG Showboat",
            Self::RawGoat => "rawgoat",
            Self::Speedboat => "Speedboat",
            Self::SajuukBot => "SajuukBot",
            Self::Vortex => "Vortex",
            Self::DiscordJson => "Discord JSON",
        }
    }

    /// The grammar family, or `None` for [`LogType::DiscordJson`].
    pub const fn format(self) -> Option<LogFormat> {
        let format = match self {
            Self::Auttaja => LogFormat::Auttaja,
            Self::CapnBot => LogFormat::CapnBot,
            Self::GearBot => LogFormat::GearBot,
            Self::GiraffeDuck => LogFormat::GiraffeDuck,
            Self::InviteDeleter => LogFormat::InviteDeleter,
            Self::Logger => LogFormat::Logger,
            Self::ModMailBot => LogFormat::ModMailBot,
            Self::RosalinaBottings => LogFormat::RosalinaBottings,
            Self::Rowboat
            | Self::Aperture
            | Self::FlygBat
            | Self::Heimdallr
            | Self::Jetski
            | Self::LmgShowboat
            | Self::RawGoat
            | Self::Speedboat => LogFormat::Rowboat,
            Self::SajuukBot => LogFormat::SajuukBot,
            Self::Vortex => LogFormat::Vortex,
            Self::DiscordJson => return None,
        };
        Some(format)
    }

    /// Look up a log type by tag or display name, ignoring case.
    pub fn from_tag(tag: &str) -> Result<Self, LogviewError> {
        let wanted = tag.trim();
        Self::ALL
            .into_iter()
            .find(|t| {
                t.tag().eq_ignore_ascii_case(wanted) || t.display_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| LogviewError::UnknownLogType(wanted.to_string()))
    }

    /// The Rowboat flavour hosted at a dashboard domain, e.g. `mod.warframe.gg`.
    pub fn from_rowboat_host(host: &str) -> Option<Self> {
        let host = host.trim().trim_end_matches('/').to_ascii_lowercase();
        let host = host
            .strip_prefix("https://")
            .or_else(|| host.strip_prefix("http://"))
            .unwrap_or(&host);
        let host = host.split('/').next().unwrap_or(host);
        match host {
            "dashboard.aperturebot.science" => Some(Self::Aperture),
            "flyg.farkasdev.com" => Some(Self::FlygBat),
            "mod.warframe.gg" => Some(Self::Heimdallr),
            "jetski.ga" => Some(Self::Jetski),
            "jake.dooleylabs.com" => Some(Self::LmgShowboat),
            "rawgo.at" => Some(Self::RawGoat),
            "row.swvn.io" => Some(Self::Speedboat),
            _ => None,
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for LogType {
    type Err = LogviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_tag(s)
    }
}

impl LogFormat {
    /// How raw text is cut into per-record blocks for this grammar.
    pub const fn reassembly(self) -> Reassembly {
        match self {
            Self::Auttaja => Auttaja::REASSEMBLY,
            Self::CapnBot => CapnBot::REASSEMBLY,
            Self::GearBot => GearBot::REASSEMBLY,
            Self::GiraffeDuck => GiraffeDuck::REASSEMBLY,
            Self::InviteDeleter => InviteDeleter::REASSEMBLY,
            Self::Logger => Logger::REASSEMBLY,
            Self::ModMailBot => ModMailBot::REASSEMBLY,
            Self::RosalinaBottings => RosalinaBottings::REASSEMBLY,
            Self::Rowboat => Rowboat::REASSEMBLY,
            Self::SajuukBot => SajuukBot::REASSEMBLY,
            Self::Vortex => Vortex::REASSEMBLY,
        }
    }

    /// Run this grammar over a whole (LF-normalized) log.
    pub(crate) fn extract(self, text: &str) -> Vec<RawFields> {
        match self {
            Self::Auttaja => extract::<Auttaja>(text),
            Self::CapnBot => extract::<CapnBot>(text),
            Self::GearBot => extract::<GearBot>(text),
            Self::GiraffeDuck => extract::<GiraffeDuck>(text),
            Self::InviteDeleter => extract::<InviteDeleter>(text),
            Self::Logger => extract::<Logger>(text),
            Self::ModMailBot => extract::<ModMailBot>(text),
            Self::RosalinaBottings => extract::<RosalinaBottings>(text),
            Self::Rowboat => extract::<Rowboat>(text),
            Self::SajuukBot => extract::<SajuukBot>(text),
            Self::Vortex => extract::<Vortex>(text),
        }
    }
}
