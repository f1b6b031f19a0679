//! `sayve`: keeps named directory trees backed up in a central archive.
//!
//! # Overview
//!
//! Each *entry* maps a short name to a live directory.  Entries live in a flat
//! text database (`name:path` per line, `#` prefix = inactive).  Running
//! `sayve` with no command merge-copies every active entry into
//! `<archive_root>/<name>/`.  Commands add and remove entries, toggle them,
//! restore them from the archive, or *freeze* them (back up, then delete the
//! local copy to reclaim space).
//!
//! # Usage
//!
//! ```text
//! sayve                         # back up every active entry
//! sayve -l                      # list entries
//! sayve -a games ~/games        # add an entry
//! sayve -d games                # disable (skip in sweeps)
//! sayve -f games                # back up, delete source, disable
//! sayve -r games                # copy back from the archive, enable
//! sayve -x games                # forget the entry (archive is kept)
//! ```
//!
//! # Module layout
//!
//! | Module                   | Responsibility                              |
//! |--------------------------|---------------------------------------------|
//! | [`cli`]                  | Argument types parsed by clap               |
//! | [`config`]               | Database / archive paths, TOML loader       |
//! | [`entry`]                | `Entry` record and name validation          |
//! | [`database`]             | Text codec for the entry database           |
//! | [`store`]                | In-memory store, load and atomic save       |
//! | [`sync`]                 | Merge-copy, backup, restore, freeze         |
//! | [`ui`]                   | Spinner, outcome lines, summary banner      |
//! | [`commands`]             | One handler per command                     |

mod cli;
mod commands;
mod config;
mod database;
mod entry;
mod store;
mod sync;
mod ui;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use commands::Command;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // Help and version go to stdout and succeed; anything else is a
            // usage error.
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        },
    };

    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            ui::error(format!("{e:#}"));
            ExitCode::FAILURE
        },
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let cfg = config::load(cli.config.as_deref(), cli.overrides())?;
    tracing::debug!(?cfg, "resolved configuration");

    if cli.print_config {
        print!("{}", cfg.to_toml()?);
        return Ok(ExitCode::SUCCESS);
    }

    commands::dispatch(Command::from_cli(cli), &cfg)
}

/// Diagnostics go to stderr.  `RUST_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("sayve={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
