//! `sayve --list`

use std::process::ExitCode;

use console::style;

use crate::{entry::Entry, store::EntryStore};

pub fn run(store: &EntryStore) -> ExitCode {
    if store.all().is_empty() {
        println!("No entries.  Add one with `sayve --add <name> <path>`.");
        return ExitCode::SUCCESS;
    }

    for entry in store.all() {
        if console::colors_enabled() {
            println!("{}\n", styled(entry));
        } else {
            println!("{entry}\n");
        }
    }
    ExitCode::SUCCESS
}

fn styled(entry: &Entry) -> String {
    let tag = format!("[{}]", entry.tag());
    let tag = if entry.active {
        style(tag).green().bold()
    } else {
        style(tag).dim()
    };
    format!("{tag} {}\n\t{}", style(&entry.name).bold(), entry.path)
}
