//! Subcommand definitions and their execution against a [`ConfigStore`].
//!
//! Output goes to the supplied writer so the commands can be tested without
//! capturing the process's stdout.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Subcommand;
use confstore_core::ConfigStore;
use tracing::info;

/// Operations on the configuration file.
///
/// Use `""` as the section name to address keys that appear before any
/// `[section]` header.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print a value.  Exits with status 1 if it is not set.
    Get { section: String, key: String },

    /// Set a value and save the file in place.
    Set {
        section: String,
        key: String,
        value: String,
    },

    /// Remove a value and save the file.  Exits with status 1 if it was not set.
    Unset { section: String, key: String },

    /// List section names, one per line.
    Sections,

    /// List the keys of a section, one per line.
    Keys { section: String },

    /// Print the whole configuration in canonical form.
    Dump {
        /// Emit a JSON object of objects instead of the config format.
        #[arg(long)]
        json: bool,
    },

    /// Report malformed lines.  Exits with status 1 if there are any.
    Check,

    /// Copy the configuration file as it is on disk to DEST.
    Backup { dest: PathBuf },
}

/// How a command finished, mapped to the process exit status by `main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    /// The requested value was absent, or `check` found problems.
    Failure,
}

/// Runs `command` against `store`, writing user-facing output to `out`.
///
/// # Errors
///
/// Returns an error if writing the output, saving, or backing up fails.
pub fn run(command: &Command, store: &mut ConfigStore, out: &mut dyn Write) -> anyhow::Result<Status> {
    match command {
        Command::Get { section, key } => match store.get_value(section, key) {
            Some(value) => {
                writeln!(out, "{value}")?;
                Ok(Status::Success)
            }
            None => Ok(Status::Failure),
        },

        Command::Set {
            section,
            key,
            value,
        } => {
            store.set_value(section, key, value, false);
            save(store)?;
            info!("set [{section}] {key}");
            Ok(Status::Success)
        }

        Command::Unset { section, key } => {
            if !store.remove_value(section, key) {
                return Ok(Status::Failure);
            }
            save(store)?;
            info!("removed [{section}] {key}");
            Ok(Status::Success)
        }

        Command::Sections => {
            for section in store.get_sections() {
                writeln!(out, "{section}")?;
            }
            Ok(Status::Success)
        }

        Command::Keys { section } => {
            for key in store.get_keys(section) {
                writeln!(out, "{key}")?;
            }
            Ok(Status::Success)
        }

        Command::Dump { json } => {
            if *json {
                let rendered = serde_json::to_string_pretty(store.document())
                    .context("failed to render configuration as JSON")?;
                writeln!(out, "{rendered}")?;
            } else {
                write!(out, "{}", store.to_config_string())?;
            }
            Ok(Status::Success)
        }

        Command::Check => {
            for diagnostic in store.diagnostics() {
                writeln!(out, "{diagnostic}")?;
            }
            if store.diagnostics().is_empty() {
                Ok(Status::Success)
            } else {
                Ok(Status::Failure)
            }
        }

        Command::Backup { dest } => {
            store.try_backup_config(dest).with_context(|| {
                format!(
                    "failed to back up {} to {}",
                    store.source_path().display(),
                    dest.display()
                )
            })?;
            info!("backed up to {}", dest.display());
            Ok(Status::Success)
        }
    }
}

fn save(store: &ConfigStore) -> anyhow::Result<()> {
    store
        .try_save_to_file(None)
        .with_context(|| format!("failed to save {}", store.source_path().display()))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
