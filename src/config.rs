//! Settings loaded from `config.toml`.
//!
//! Precedence, highest first: CLI flags, then the config file
//! (`$XDG_CONFIG_HOME/logview/config.toml`, falling back to
//! `~/.config/logview/config.toml`), then built-in defaults.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::{Cli, ColorMode};
use crate::error::LogviewError;
use crate::formatter::FormatOptions;
use crate::model::DEFAULT_PAGE_SIZE;
use crate::registry::LogType;

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether stderr output is colored.
    pub color_mode: ColorMode,
    /// Log type used by `parse` when `--type` is not given.
    pub log_type: Option<LogType>,
    /// Messages per page for `parse --pages`.
    pub page_size: usize,
    /// Pretty-print JSON output.
    pub pretty: bool,
    /// Formatter options for message bodies.
    pub format: FormatOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color_mode: ColorMode::Auto,
            log_type: None,
            page_size: DEFAULT_PAGE_SIZE,
            pretty: false,
            format: FormatOptions::MESSAGE,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply global CLI flags on top.
    ///
    /// Subcommand flags are applied by the subcommand itself. A `--config`
    /// path that does not exist is an error; a missing default file is not.
    pub fn from_cli(cli: &Cli) -> Result<Self, LogviewError> {
        let mut config = Self::default();

        let config_path = cli.config.clone().unwrap_or_else(Self::default_config_path);
        if config_path.exists() {
            let file_config = FileConfig::load(&config_path)?;
            config.apply_file_config(file_config)?;
        } else if cli.config.is_some() {
            return Err(LogviewError::Config(format!(
                "config file {} does not exist",
                config_path.display()
            )));
        }

        if let Some(color) = cli.color {
            config.color_mode = color;
        }

        Ok(config)
    }

    fn default_config_path() -> PathBuf {
        let base = match (std::env::var_os("XDG_CONFIG_HOME"), std::env::var_os("HOME")) {
            (Some(xdg), _) => PathBuf::from(xdg),
            (None, Some(home)) => PathBuf::from(home).join(".config"),
            (None, None) => PathBuf::from(".config"),
        };
        base.join("logview").join("config.toml")
    }

    fn apply_file_config(&mut self, file: FileConfig) -> Result<(), LogviewError> {
        if let Some(color) = file.color {
            self.color_mode = color;
        }

        if let Some(tag) = file.log_type {
            self.log_type = Some(LogType::from_tag(&tag)?);
        }

        if let Some(page_size) = file.page_size {
            if page_size == 0 {
                return Err(LogviewError::Config("page_size must be at least 1".to_string()));
            }
            self.page_size = page_size;
        }

        if let Some(pretty) = file.pretty {
            self.pretty = pretty;
        }

        if let Some(format) = file.format {
            if let Some(masked_links) = format.masked_links {
                self.format.masked_links = masked_links;
            }
            if let Some(newlines) = format.newlines {
                self.format.newlines_to_br = newlines;
            }
        }

        Ok(())
    }
}

/// On-disk layout of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    color: Option<ColorMode>,
    log_type: Option<String>,
    page_size: Option<usize>,
    pretty: Option<bool>,
    format: Option<FormatSection>,
}

/// The `[format]` table.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FormatSection {
    masked_links: Option<bool>,
    newlines: Option<bool>,
}

impl FileConfig {
    fn load(path: &Path) -> Result<Self, LogviewError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| LogviewError::Config(format!("cannot read config file {}: {e}", path.display())))?;
        Ok(toml::from_str(&text)?)
    }
}
