//! Line-oriented database codec.
//!
//! # File format
//!
//! ```text
//! games:/home/alice/games
//! #old-project:/home/alice/src/old-project
//! ```
//!
//! One record per line.  A leading `#` marks the entry inactive.  The name is
//! split from the path at the *first* `:`, so paths may contain further colons
//! but names never can.  There is no escaping.  Blank lines are ignored.
//!
//! Parsing fails fast: a single malformed line rejects the whole file, so a
//! database that was not fully understood is never rewritten.

use std::path::PathBuf;

use thiserror::Error;

use crate::entry::{Entry, FIELD_SEPARATOR, INACTIVE_MARKER, validate_name, validate_path};

/// Errors raised while reading, parsing, or writing the database.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A line could not be turned into an [`Entry`].
    #[error("malformed record on line {line}: {content:?}")]
    MalformedRecord { line: usize, content: String },

    /// A name or path the format cannot represent.
    #[error("invalid entry {value:?}: {reason}")]
    InvalidEntry { value: String, reason: &'static str },

    /// The database file exists but could not be read.
    #[error("cannot read database {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The database could not be written back.
    #[error("cannot save database {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ─── Parse ────────────────────────────────────────────────────────────────────

/// Parse database text into entries, preserving file order.
pub fn parse(text: &str) -> Result<Vec<Entry>, DatabaseError> {
    let mut entries = Vec::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if line.is_empty() {
            continue;
        }
        entries.push(parse_record(line).ok_or_else(|| DatabaseError::MalformedRecord {
            line: idx + 1,
            content: line.to_string(),
        })?);
    }

    Ok(entries)
}

fn parse_record(line: &str) -> Option<Entry> {
    let (active, body) = match line.strip_prefix(INACTIVE_MARKER) {
        Some(rest) => (false, rest),
        None => (true, line),
    };

    let (name, path) = body.split_once(FIELD_SEPARATOR)?;
    validate_name(name).ok()?;
    validate_path(path).ok()?;

    Some(Entry {
        name: name.to_string(),
        path: path.to_string(),
        active,
    })
}

// ─── Serialize ────────────────────────────────────────────────────────────────

/// Render entries back into database text, one `\n`-terminated line each.
pub fn serialize(entries: &[Entry]) -> String {
    let mut out = String::new();
    for e in entries {
        if !e.active {
            out.push(INACTIVE_MARKER);
        }
        out.push_str(&e.name);
        out.push(FIELD_SEPARATOR);
        out.push_str(&e.path);
        out.push('\n');
    }
    out
}

// ─── Tests ────────────────────────────────────────────────────────────────────
