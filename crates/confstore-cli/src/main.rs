//! confstore: inspect and edit sectioned key/value configuration files.
//!
//! # Usage
//!
//! ```text
//! confstore --file <PATH> <COMMAND>
//!
//! Commands:
//!   get <SECTION> <KEY>           Print a value
//!   set <SECTION> <KEY> <VALUE>   Set a value and save
//!   unset <SECTION> <KEY>         Remove a value and save
//!   sections                      List sections
//!   keys <SECTION>                List the keys of a section
//!   dump [--json]                 Print the whole configuration
//!   check                         Report malformed lines
//!   backup <DEST>                 Copy the file on disk to DEST
//! ```
//!
//! `--file` falls back to the `CONFSTORE_FILE` environment variable and may
//! start with `~`.  Log output goes to stderr; its level is taken from
//! `RUST_LOG` and defaults to `warn` (`debug` with `--verbose`).
//!
//! Saving rewrites the file in canonical form: comments, blank lines, and the
//! original key order are not preserved.

mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use confstore_core::{ConfigStore, NullSink, TracingSink};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::commands::{run, Command, Status};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Inspect and edit sectioned key/value configuration files.
#[derive(Debug, Parser)]
#[command(name = "confstore", version)]
struct Cli {
    /// Configuration file to operate on.
    #[arg(long, short, env = "CONFSTORE_FILE")]
    file: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    debug!(file = %cli.file.display(), command = ?cli.command, "starting");

    // `check` prints the diagnostics itself; logging them too would
    // duplicate every line.
    let mut store = if matches!(cli.command, Command::Check) {
        ConfigStore::builder(&cli.file).sink(NullSink).build()
    } else {
        ConfigStore::builder(&cli.file).sink(TracingSink).build()
    };

    let stdout = std::io::stdout();
    let status = run(&cli.command, &mut store, &mut stdout.lock())?;

    Ok(match status {
        Status::Success => ExitCode::SUCCESS,
        Status::Failure => ExitCode::FAILURE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_set_command() {
        // Arrange / Act
        let cli = Cli::try_parse_from([
            "confstore", "--file", "~/app.conf", "set", "db", "host", "localhost",
        ])
        .expect("valid arguments");

        // Assert
        assert_eq!(cli.file, PathBuf::from("~/app.conf"));
        assert!(matches!(
            cli.command,
            Command::Set { ref section, ref key, ref value }
                if section == "db" && key == "host" && value == "localhost"
        ));
    }

    #[test]
    fn test_parse_root_section_as_empty_string() {
        let cli = Cli::try_parse_from(["confstore", "-f", "app.conf", "get", "", "orphan"])
            .expect("valid arguments");
        assert!(matches!(
            cli.command,
            Command::Get { ref section, .. } if section.is_empty()
        ));
    }

    #[test]
    fn test_parse_dump_json_flag() {
        let cli = Cli::try_parse_from(["confstore", "-f", "app.conf", "dump", "--json"])
            .expect("valid arguments");
        assert!(matches!(cli.command, Command::Dump { json: true }));
    }
}
