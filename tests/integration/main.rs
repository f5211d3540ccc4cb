//! CLI integration tests for the `logview` binary.

use assert_cmd::Command;

mod cli_format;
mod cli_parse;
mod config_file;
mod formats;

/// A `logview` command isolated from the user's config file.
pub fn logview() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("logview").unwrap();
    cmd.env("XDG_CONFIG_HOME", "/nonexistent/logview-test-config");
    cmd.env_remove("LOGVIEW_LOG");
    cmd
}

/// Absolute path of a file under `tests/fixtures`.
pub fn fixture(name: &str) -> String {
    format!("{}/tests/fixtures/{name}", env!("CARGO_MANIFEST_DIR"))
}

/// Run `logview parse` and decode its stdout as JSON.
pub fn parse_json(args: &[&str]) -> serde_json::Value {
    let output = logview().arg("parse").args(args).output().unwrap();
    assert!(
        output.status.success(),
        "logview parse {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}
