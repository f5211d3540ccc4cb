use std::fs;
use std::io::{self, BufWriter, IsTerminal, Read, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

use logview::cli::{Cli, ColorMode, Command, FormatArgs, ParseArgs};
use logview::config::Config;
use logview::{LogParser, LogType, LogviewError, ParsedLog, format};

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "LOGVIEW_LOG";

fn main() -> ExitCode {
    reset_sigpipe();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            // Usage errors exit 1; `--help` and `--version` succeed.
            return if e.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("logview: {e}");
            return ExitCode::from(e.exit_code());
        }
    };

    let use_color = resolve_color_mode(config.color_mode);
    init_tracing(cli.verbose, use_color);

    let result = match &cli.command {
        Command::Parse(args) => run_parse(args, &config, use_color),
        Command::Format(args) => run_format(args, &config),
        Command::Types => run_types(use_color),
        Command::Completions { shell } => {
            clap_complete::generate(*shell, &mut Cli::command(), "logview", &mut io::stdout());
            Ok(())
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(LogviewError::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(e) => {
            if use_color {
                eprintln!("{} {e}", "logview:".red().bold());
            } else {
                eprintln!("logview: {e}");
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn run_parse(args: &ParseArgs, config: &Config, use_color: bool) -> Result<(), LogviewError> {
    let log_type = if args.json {
        LogType::DiscordJson
    } else {
        args.log_type.or(config.log_type).ok_or_else(|| {
            LogviewError::Config("no log type given; pass --type or set log_type in the config file".to_string())
        })?
    };

    let input = read_input(args.file.as_deref())?;
    let log = LogParser::new(log_type)
        .format_options(config.format)
        .parse_bytes(&input)?;

    let pretty = args.pretty || config.pretty;
    let page_size = args.page_size.unwrap_or(config.page_size);
    let json = if args.pages {
        to_json(&log.paged(page_size), pretty)?
    } else {
        to_json(&log, pretty)?
    };

    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    writeln!(writer, "{json}")?;
    writer.flush()?;

    print_summary(&log, use_color);
    Ok(())
}

fn run_format(args: &FormatArgs, config: &Config) -> Result<(), LogviewError> {
    let text = match &args.text {
        Some(text) => text.clone(),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };

    let mut options = config.format;
    if args.masked_links {
        options.masked_links = true;
    }
    if args.no_newlines {
        options.newlines_to_br = false;
    }
    if let Some(mode) = args.mode {
        options.embed_mode = mode;
    }

    let html = format(&text, &[], options);
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    writeln!(writer, "{html}")?;
    Ok(())
}

fn run_types(use_color: bool) -> Result<(), LogviewError> {
    let stdout = io::stdout();
    let mut writer = BufWriter::new(stdout.lock());
    for log_type in LogType::ALL {
        let tag = log_type.tag();
        if use_color {
            writeln!(writer, "{:<18} {}", tag.bold(), log_type.display_name())?;
        } else {
            writeln!(writer, "{tag:<18} {}", log_type.display_name())?;
        }
    }
    writer.flush()?;
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<Vec<u8>, LogviewError> {
    match path {
        Some(path) => fs::read(path).map_err(|e| {
            LogviewError::Io(io::Error::new(e.kind(), format!("{}: {e}", path.display())))
        }),
        None => {
            let mut input = Vec::new();
            io::stdin().lock().read_to_end(&mut input)?;
            Ok(input)
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, LogviewError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    json.map_err(LogviewError::Output)
}

/// One line on stderr: message, user and error counts.
fn print_summary(log: &ParsedLog, use_color: bool) {
    let messages = log.messages.len();
    let users = log.users.len();
    let errors = log.messages.iter().filter(|m| m.error).count();
    if use_color {
        let errors = if errors == 0 {
            errors.green().to_string()
        } else {
            errors.yellow().bold().to_string()
        };
        eprintln!(
            "{} {} messages, {} users, {errors} errors",
            log.log_type.bold(),
            messages.cyan(),
            users.cyan(),
        );
    } else {
        eprintln!("{}: {messages} messages, {users} users, {errors} errors", log.log_type);
    }
}

fn init_tracing(verbose: bool, use_color: bool) {
    let default = if verbose { "logview=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(use_color)
        .with_target(false)
        .init();
}

fn resolve_color_mode(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            if !io::stderr().is_terminal() {
                return false;
            }
            if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
                return false;
            }
            if std::env::var("TERM").is_ok_and(|v| v == "dumb") {
                return false;
            }
            true
        }
    }
}

/// Let SIGPIPE terminate the process, so `logview parse log.txt | head`
/// ends without an error message.
#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn reset_sigpipe() {}
