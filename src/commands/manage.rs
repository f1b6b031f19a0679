//! Database-only commands: `--add`, `--delete`, `--enable`, `--disable`.
//!
//! None of these touch the archive.  Each saves the database only when it
//! actually changed something.

use std::process::ExitCode;

use crate::{
    commands::{persist, report_unknown},
    entry::Entry,
    store::EntryStore,
    ui::{self, StageOutcome},
};

pub fn add(store: &mut EntryStore, name: String, path: String) -> ExitCode {
    let entry = match Entry::new(name, path) {
        Ok(entry) => entry,
        Err(e) => {
            ui::error(e);
            return ExitCode::FAILURE;
        },
    };

    if store.find_by_name(&entry.name).is_some() {
        ui::warn(format!(
            "an entry named '{}' already exists; both will be kept",
            entry.name
        ));
    }

    StageOutcome::done(format!("Added {}", entry.name), entry.path.clone()).print();
    store.add(entry);
    persist(store);
    ExitCode::SUCCESS
}

/// Deleting a name that does not exist is a no-op: a warning is printed, the
/// database is left byte-for-byte untouched, and the exit code is 0.
pub fn delete(store: &mut EntryStore, name: &str) -> ExitCode {
    match store.remove_by_name(name) {
        0 => report_unknown(name),
        n => {
            StageOutcome::done(format!("Deleted {name}"), plural(n, "record")).print();
            persist(store);
        },
    }
    ExitCode::SUCCESS
}

pub fn set_active(store: &mut EntryStore, name: &str, active: bool) -> ExitCode {
    let verb = if active { "Enabled" } else { "Disabled" };
    match store.set_active(name, active) {
        0 => report_unknown(name),
        n => {
            StageOutcome::done(format!("{verb} {name}"), plural(n, "record")).print();
            persist(store);
        },
    }
    ExitCode::SUCCESS
}

pub(crate) fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {noun}")
    } else {
        format!("{n} {noun}s")
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
