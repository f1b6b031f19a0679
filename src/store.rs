//! In-memory entry store backed by the database file.
//!
//! The store is loaded once per invocation and written back only after a
//! mutation.  Name matching follows one rule everywhere: lookups return the
//! first record with a given name, mutations apply to *every* record with that
//! name and report how many were touched.

use std::path::{Path, PathBuf};

use crate::{
    database::{self, DatabaseError},
    entry::Entry,
};

#[derive(Debug)]
pub struct EntryStore {
    path: PathBuf,
    entries: Vec<Entry>,
}

impl EntryStore {
    /// Load the database at `path`.  A missing file is an empty store.
    pub fn load(path: &Path) -> Result<Self, DatabaseError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("database {} not found, starting empty", path.display());
                String::new()
            },
            Err(source) => {
                return Err(DatabaseError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            },
        };

        let entries = database::parse(&text)?;
        tracing::debug!("loaded {} entries from {}", entries.len(), path.display());

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// Location this store saves to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn all(&self) -> &[Entry] {
        &self.entries
    }

    /// First entry called `name`.
    pub fn find_by_name(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Every entry called `name`, in file order.
    pub fn matching_mut<'a>(&'a mut self, name: &'a str) -> impl Iterator<Item = &'a mut Entry> {
        self.entries.iter_mut().filter(move |e| e.name == name)
    }

    /// Append without checking for an existing name.
    pub fn add(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Remove every entry called `name`, returning how many were removed.
    pub fn remove_by_name(&mut self, name: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.name != name);
        before - self.entries.len()
    }

    /// Set the active flag on every entry called `name`, returning the number
    /// of matches.
    pub fn set_active(&mut self, name: &str, active: bool) -> usize {
        let mut count = 0;
        for e in self.matching_mut(name) {
            e.active = active;
            count += 1;
        }
        count
    }

    /// Write the store back to disk.
    ///
    /// The text goes to `<database>.tmp` first and is renamed over the real
    /// file, so an interrupted save never leaves a truncated database.
    pub fn save(&self) -> Result<(), DatabaseError> {
        let save_err = |source: std::io::Error| DatabaseError::Save {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(save_err)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, database::serialize(&self.entries)).map_err(save_err)?;
        if let Err(e) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(save_err(e));
        }

        tracing::debug!("saved {} entries to {}", self.entries.len(), self.path.display());
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
