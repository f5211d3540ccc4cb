//! Command-line argument definitions for `logview`.
//!
//! Uses [`clap`] derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use serde::Deserialize;

use crate::formatter::EmbedMode;
use crate::registry::LogType;

/// Turn Discord logging-bot output into styled HTML chat transcripts.
#[derive(Debug, Parser)]
#[command(name = "logview", version, about, long_about = None)]
pub struct Cli {
    /// Control color output on stderr.
    ///
    /// `auto` enables colors only when stderr is a TTY and `NO_COLOR` is unset.
    #[arg(short = 'c', long, value_enum, global = true)]
    pub color: Option<ColorMode>,

    /// Path to configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log pipeline details to stderr.
    ///
    /// Equivalent to `LOGVIEW_LOG=debug`; an explicit `LOGVIEW_LOG` wins.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a log and print it as JSON.
    Parse(ParseArgs),
    /// Render Discord markdown as HTML.
    Format(FormatArgs),
    /// List supported log types.
    Types,
    /// Print shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Log type tag or display name (see `logview types`).
    #[arg(short = 't', long = "type", value_parser = parse_log_type, conflicts_with = "json")]
    pub log_type: Option<LogType>,

    /// Read a JSON array of Discord API messages.
    #[arg(short = 'j', long)]
    pub json: bool,

    /// Print the log split into pages.
    #[arg(long)]
    pub pages: bool,

    /// Messages per page with `--pages`.
    #[arg(long, value_parser = parse_page_size)]
    pub page_size: Option<usize>,

    /// Pretty-print the JSON output.
    #[arg(short = 'p', long)]
    pub pretty: bool,

    /// Log file to read; stdin when omitted.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct FormatArgs {
    /// Render `[text](url)` masked links.
    #[arg(long)]
    pub masked_links: bool,

    /// Keep newlines instead of converting them to `<br>`.
    #[arg(long)]
    pub no_newlines: bool,

    /// Surface the text is formatted for.
    #[arg(short = 'm', long, value_enum)]
    pub mode: Option<EmbedMode>,

    /// Text to format; stdin when omitted.
    pub text: Option<String>,
}

/// Color output mode, set by `--color` or `color` in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Enable colors only when stderr is a TTY.
    Auto,
    /// Always enable colors.
    Always,
    /// Never enable colors.
    Never,
}

/// Parse a log type argument by tag or display name.
fn parse_log_type(s: &str) -> Result<LogType, String> {
    LogType::from_tag(s).map_err(|_| {
        let tags: Vec<&str> = LogType::ALL.iter().map(|t| t.tag()).collect();
        format!("invalid log type '{s}': expected one of {}", tags.join(", "))
    })
}

fn parse_page_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) | Err(_) => Err(format!("invalid page size '{s}': expected a positive integer")),
        Ok(n) => Ok(n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_type_valid() {
        assert_eq!(parse_log_type("rowboat").unwrap(), LogType::Rowboat);
        assert_eq!(parse_log_type("GEARBOT").unwrap(), LogType::GearBot);
        assert_eq!(parse_log_type("discord_json").unwrap(), LogType::DiscordJson);
    }

    #[test]
    fn test_parse_log_type_invalid() {
        let err = parse_log_type("irc").unwrap_err();
        assert!(err.contains("invalid log type"));
        assert!(err.contains("vortex"));
    }

    #[test]
    fn test_parse_page_size() {
        assert_eq!(parse_page_size("10").unwrap(), 10);
        assert!(parse_page_size("0").is_err());
        assert!(parse_page_size("-1").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["logview", "parse", "--type", "vortex", "-v", "--color", "never"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.color, Some(ColorMode::Never));
        match cli.command {
            Command::Parse(args) => assert_eq!(args.log_type, Some(LogType::Vortex)),
            other => panic!("unexpected command {other:?}"),
        }
    }
}
