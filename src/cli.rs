//! Command-line interface definition.
//!
//! All argument parsing lives here so the rest of the codebase can stay
//! agnostic to `clap`.  The command flags form one mutually exclusive group;
//! their operands are declared optional so that a missing name or path reaches
//! the dispatcher, which reports it in its own words.

use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser};

use crate::config::PartialConfig;

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(
    name    = "sayve",
    about   = "Back up named directory trees into a central archive",
    version,
    disable_version_flag = true,
    group(ArgGroup::new("command").multiple(false)),
    // Show a compact two-column help layout.
    help_template = "\
{before-help}{name} {version}
{about}

{usage-heading} {usage}

{all-args}{after-help}",
    after_help = "Without a command, every active entry is backed up."
)]
pub struct Cli {
    /// Display program version information.
    #[arg(short = 'v', long, action = ArgAction::Version)]
    pub version: Option<bool>,

    /// List database entries.
    #[arg(short, long, group = "command")]
    pub list: bool,

    /// Disable entry.
    #[arg(short, long, value_name = "ENTRY", num_args = 0..=1, group = "command")]
    pub disable: Option<Option<String>>,

    /// Enable entry.
    #[arg(short, long, value_name = "ENTRY", num_args = 0..=1, group = "command")]
    pub enable: Option<Option<String>>,

    /// Restore an entry from its backup.
    #[arg(short, long, value_name = "ENTRY", num_args = 0..=1, group = "command")]
    pub restore: Option<Option<String>>,

    /// Back up an entry and delete its source files.
    #[arg(short, long, value_name = "ENTRY", num_args = 0..=1, group = "command")]
    pub freeze: Option<Option<String>>,

    /// Add an entry.
    #[arg(
        short,
        long,
        value_names = ["NAME", "PATH"],
        num_args = 0..=2,
        group = "command"
    )]
    pub add: Option<Vec<String>>,

    /// Delete entry.
    #[arg(short = 'x', long, value_name = "ENTRY", num_args = 0..=1, group = "command")]
    pub delete: Option<Option<String>>,

    /// Configuration file.
    ///
    /// Defaults to `sayve/config.toml` under the platform config directory.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Use this entry database instead of the configured one.
    #[arg(long, value_name = "FILE")]
    pub database: Option<String>,

    /// Use this archive root instead of the configured one.
    #[arg(long, value_name = "DIR")]
    pub archive: Option<String>,

    /// Print the resolved configuration as TOML and exit.
    #[arg(long)]
    pub print_config: bool,

    /// Log every copied file to stderr.
    #[arg(long)]
    pub verbose: bool,
}

impl Cli {
    /// The command-line layer of the configuration.
    pub fn overrides(&self) -> PartialConfig {
        PartialConfig {
            database: self.database.clone(),
            archive_root: self.archive.clone(),
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
