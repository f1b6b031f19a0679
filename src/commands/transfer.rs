//! `--restore` and `--freeze`: single-entry commands that move files.
//!
//! Both act on every record with the given name.  The database is saved once
//! at the end if at least one record changed.

use std::process::ExitCode;

use crate::{
    commands::{manage::plural, persist, report_unknown, run::describe_backup},
    store::EntryStore,
    sync::SyncEngine,
    ui::{self, StageOutcome},
};

pub fn restore(store: &mut EntryStore, engine: &SyncEngine, name: &str) -> ExitCode {
    let mut matched = 0;
    let mut changed = 0;

    for entry in store.matching_mut(name) {
        matched += 1;
        let label = format!("Restore {}", entry.name);
        let outcome = match ui::with_spinner(&label, || engine.restore(entry)) {
            Ok(stats) => {
                changed += 1;
                StageOutcome::done(label, format!("{} copied", plural(stats.files_copied, "file")))
            },
            Err(e) => StageOutcome::failed(label, e),
        };
        outcome.print();
    }

    finish(store, name, matched, changed)
}

/// Freezing removes the source tree with no confirmation once the backup has
/// not failed.
pub fn freeze(store: &mut EntryStore, engine: &SyncEngine, name: &str) -> ExitCode {
    let mut matched = 0;
    let mut changed = 0;

    for entry in store.matching_mut(name) {
        matched += 1;
        let label = format!("Freeze {}", entry.name);
        let outcome = match ui::with_spinner(&label, || engine.freeze(entry)) {
            Ok(frozen) => {
                changed += 1;
                let removed = if frozen.removed_source {
                    "source removed"
                } else {
                    "no source to remove"
                };
                StageOutcome::done(label, format!("{}, {removed}", describe_backup(frozen.backup)))
            },
            Err(e) => StageOutcome::failed(label, e),
        };
        outcome.print();
    }

    finish(store, name, matched, changed)
}

fn finish(store: &EntryStore, name: &str, matched: usize, changed: usize) -> ExitCode {
    if matched == 0 {
        report_unknown(name);
    } else if changed > 0 {
        persist(store);
    }
    ExitCode::SUCCESS
}

// ─── Tests ────────────────────────────────────────────────────────────────────
