//! Command dispatch.
//!
//! Exactly one command runs per invocation:
//!
//! | File          | Invocation                 | Description                          |
//! |---------------|----------------------------|--------------------------------------|
//! | `list.rs`     | `sayve -l`                 | Print every entry                    |
//! | `manage.rs`   | `sayve -a/-x/-e/-d …`      | Add, delete, enable, disable entries |
//! | `transfer.rs` | `sayve -r/-f <entry>`      | Restore or freeze an entry           |
//! | `run.rs`      | `sayve` (default)          | Back up every active entry           |
//!
//! Operands are checked before the database is even loaded, so a usage error
//! never touches the file.

pub mod list;
pub mod manage;
pub mod run;
pub mod transfer;

use std::process::ExitCode;

use anyhow::{Context, Result};

use crate::{cli::Cli, config::Config, store::EntryStore, sync::SyncEngine, ui};

/// A recognised command with whatever operands followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Enable(Option<String>),
    Disable(Option<String>),
    Restore(Option<String>),
    Freeze(Option<String>),
    Add {
        name: Option<String>,
        path: Option<String>,
    },
    Delete(Option<String>),
    Sweep,
}

/// A command whose required operands are all present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    List,
    SetActive { name: String, active: bool },
    Restore(String),
    Freeze(String),
    Add { name: String, path: String },
    Delete(String),
    Sweep,
}

impl Command {
    /// Pick the command selected on the command line.  clap guarantees at most
    /// one is present.
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.list {
            Self::List
        } else if let Some(name) = &cli.enable {
            Self::Enable(name.clone())
        } else if let Some(name) = &cli.disable {
            Self::Disable(name.clone())
        } else if let Some(name) = &cli.restore {
            Self::Restore(name.clone())
        } else if let Some(name) = &cli.freeze {
            Self::Freeze(name.clone())
        } else if let Some(operands) = &cli.add {
            let mut operands = operands.iter().cloned();
            Self::Add {
                name: operands.next(),
                path: operands.next(),
            }
        } else if let Some(name) = &cli.delete {
            Self::Delete(name.clone())
        } else {
            Self::Sweep
        }
    }

    /// Check operands, returning the message to show when one is missing.
    pub fn into_action(self) -> Result<Action, &'static str> {
        let required = |operand: Option<String>, msg: &'static str| operand.ok_or(msg);
        Ok(match self {
            Self::List => Action::List,
            Self::Sweep => Action::Sweep,
            Self::Enable(name) => Action::SetActive {
                name: required(name, "Please specify entry to enable.")?,
                active: true,
            },
            Self::Disable(name) => Action::SetActive {
                name: required(name, "Please specify entry to disable.")?,
                active: false,
            },
            Self::Restore(name) => {
                Action::Restore(required(name, "Please specify entry to restore.")?)
            },
            Self::Freeze(name) => {
                Action::Freeze(required(name, "Please specify entry to freeze.")?)
            },
            Self::Delete(name) => {
                Action::Delete(required(name, "Please specify entry to delete.")?)
            },
            Self::Add { name, path } => Action::Add {
                name: required(name, "Please specify the name and path to the entry.")?,
                path: required(path, "Please specify the path to the entry.")?,
            },
        })
    }
}

/// Run `command` against the configured database and archive.
///
/// Returns the process exit code.  Errors that escape (an unreadable or
/// malformed database) are reported by `main` and exit 1.
pub fn dispatch(command: Command, cfg: &Config) -> Result<ExitCode> {
    let action = match command.into_action() {
        Ok(action) => action,
        Err(msg) => {
            ui::error(msg);
            return Ok(ExitCode::FAILURE);
        },
    };

    let mut store = EntryStore::load(&cfg.database)
        .with_context(|| format!("loading {}", cfg.database.display()))?;
    let engine = SyncEngine::new(&cfg.archive_root);

    let code = match action {
        Action::List => list::run(&store),
        Action::SetActive { name, active } => manage::set_active(&mut store, &name, active),
        Action::Add { name, path } => manage::add(&mut store, name, path),
        Action::Delete(name) => manage::delete(&mut store, &name),
        Action::Restore(name) => transfer::restore(&mut store, &engine, &name),
        Action::Freeze(name) => transfer::freeze(&mut store, &engine, &name),
        Action::Sweep => run::run(&store, &engine),
    };
    Ok(code)
}

/// Write the store back, reporting (not propagating) a failure.  The
/// in-memory state stays valid for the rest of the run either way.
pub(crate) fn persist(store: &EntryStore) {
    if let Err(e) = store.save() {
        ui::error(e);
        ui::warn(format!("changes were not saved to {}", store.path().display()));
    }
}

pub(crate) fn report_unknown(name: &str) {
    ui::warn(format!("no entry named '{name}'"));
}

// ─── Tests ────────────────────────────────────────────────────────────────────
