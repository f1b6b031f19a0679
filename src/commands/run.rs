//! Default sweep: runs when no command is given.
//!
//! Every entry is handed to [`SyncEngine::backup`]; inactive entries and
//! entries whose source is missing come back as skips.  A failure on one entry
//! is reported and the sweep moves on to the next.  The database is never
//! written by a sweep.

use std::process::ExitCode;

use crate::{
    commands::manage::plural,
    store::EntryStore,
    sync::{BackupOutcome, SkipReason, SyncEngine},
    ui::{self, StageOutcome, print_summary},
};

pub fn run(store: &EntryStore, engine: &SyncEngine) -> ExitCode {
    println!();
    println!(
        "  {} {}",
        console::style("Archive:").dim(),
        engine.archive_root().display()
    );

    let outcomes: Vec<StageOutcome> = store
        .all()
        .iter()
        .map(|entry| {
            let label = format!("Backup {}", entry.name);
            let outcome = match ui::with_spinner(&label, || engine.backup(entry)) {
                Ok(BackupOutcome::Skipped(SkipReason::SourceMissing)) => StageOutcome::skipped(
                    label,
                    format!("skipping, \"{}\" does not exist", entry.path),
                ),
                Ok(backup @ BackupOutcome::Skipped(_)) => {
                    StageOutcome::skipped(label, describe_backup(backup))
                },
                Ok(backup) => StageOutcome::done(label, describe_backup(backup)),
                Err(e) => StageOutcome::failed(label, e),
            };
            outcome.print();
            outcome
        })
        .collect();

    print_summary(&outcomes);
    ExitCode::SUCCESS
}

/// Short description of a backup result for outcome lines.
pub fn describe_backup(outcome: BackupOutcome) -> String {
    match outcome {
        BackupOutcome::Copied(stats) => {
            let mut text = if stats.files_copied == 0 {
                "up to date".to_string()
            } else {
                format!(
                    "{} copied, {} unchanged",
                    plural(stats.files_copied, "file"),
                    stats.files_unchanged
                )
            };
            if stats.skipped > 0 {
                text.push_str(&format!(", {} skipped", stats.skipped));
            }
            text
        },
        BackupOutcome::Skipped(SkipReason::Inactive) => "inactive".into(),
        BackupOutcome::Skipped(SkipReason::SourceMissing) => "source missing".into(),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
