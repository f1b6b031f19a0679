//! The `Entry` record: a named source directory plus its active flag.

use std::fmt;

use crate::database::DatabaseError;

/// Separates `name` from `path` in a database record.
pub const FIELD_SEPARATOR: char = ':';

/// Prefix marking an inactive record.
pub const INACTIVE_MARKER: char = '#';

/// One backed-up directory tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Short identifier, also the directory name under the archive root.
    pub name: String,
    /// Live source directory.  Stored verbatim, never normalised.
    pub path: String,
    /// Whether the default sweep backs this entry up.
    pub active: bool,
}

impl Entry {
    /// Build an active entry, rejecting names and paths the database format
    /// cannot represent.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Result<Self, DatabaseError> {
        let name = name.into();
        let path = path.into();
        validate_name(&name)?;
        validate_path(&path)?;
        Ok(Self {
            name,
            path,
            active: true,
        })
    }

    /// One-character state tag used by `--list`.
    pub const fn tag(&self) -> &'static str {
        if self.active { "A" } else { "D" }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}\n\t{}", self.tag(), self.name, self.path)
    }
}

// ─── Validation ───────────────────────────────────────────────────────────────

/// Check that `name` survives a round-trip through the database and is safe
/// to use as a single path component under the archive root.
pub fn validate_name(name: &str) -> Result<(), DatabaseError> {
    let reason = if name.is_empty() {
        Some("name is empty")
    } else if name.contains(FIELD_SEPARATOR) {
        Some("name contains ':'")
    } else if name.contains(['\n', '\r']) {
        Some("name contains a line break")
    } else if name.starts_with(INACTIVE_MARKER) {
        Some("name starts with '#'")
    } else if name.contains('/') || name == "." || name == ".." {
        Some("name is not a single directory component")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(DatabaseError::InvalidEntry {
            value: name.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Paths may contain `:` (only the first one splits a record) but not line
/// breaks.
pub fn validate_path(path: &str) -> Result<(), DatabaseError> {
    let reason = if path.is_empty() {
        Some("path is empty")
    } else if path.contains(['\n', '\r']) {
        Some("path contains a line break")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(DatabaseError::InvalidEntry {
            value: path.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
