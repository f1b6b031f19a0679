//! Configuration types and loading logic.
//!
//! Two settings matter: where the entry database lives and where archived
//! trees go.  Both have built-in defaults, both may be set in a TOML file, and
//! both may be overridden on the command line.  Later layers win per field.
//!
//! # File format
//!
//! ```toml
//! database     = "~/.config/sayve/paths.conf"
//! archive_root = "/mnt/archive/saves"
//! ```
//!
//! A leading `~/` expands to the home directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Directory name used under the platform config dir.
pub const APP_DIR: &str = "sayve";

// ─── Resolved config ──────────────────────────────────────────────────────────

/// Fully resolved settings handed to the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Flat text database of entries.
    pub database: PathBuf,

    /// Directory holding one subdirectory per archived entry.
    ///
    /// Must exist before a backup runs; it is typically a mount point.
    pub archive_root: PathBuf,
}

impl Config {
    /// Render as a config file that reproduces these settings.
    pub fn to_toml(&self) -> Result<String> {
        let layer = PartialConfig {
            database: Some(self.database.display().to_string()),
            archive_root: Some(self.archive_root.display().to_string()),
        };
        toml::to_string(&layer).context("rendering configuration as TOML")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            archive_root: default_archive_root(),
        }
    }
}

// ─── Partial layer ────────────────────────────────────────────────────────────

/// One configuration layer.  Absent fields defer to the layer below.
#[derive(Debug, Default, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    #[serde(default)]
    pub database: Option<String>,

    #[serde(default)]
    pub archive_root: Option<String>,
}

impl PartialConfig {
    /// Overlay `other` on top of `self`.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            database: other.database.or(self.database),
            archive_root: other.archive_root.or(self.archive_root),
        }
    }

    /// Fill the gaps with defaults and expand `~/`.
    pub fn resolve(self) -> Config {
        let defaults = Config::default();
        Config {
            database: self
                .database
                .map_or(defaults.database, |p| expand_home(&p)),
            archive_root: self
                .archive_root
                .map_or(defaults.archive_root, |p| expand_home(&p)),
        }
    }
}

// ─── Defaults ─────────────────────────────────────────────────────────────────

/// `<config dir>/sayve/config.toml`, if the platform has a config dir.
pub fn default_config_file() -> Option<PathBuf> {
    dirs_next::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

pub fn default_database() -> PathBuf {
    dirs_next::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_default()
        .join("paths.conf")
}

pub fn default_archive_root() -> PathBuf {
    PathBuf::from("/mnt/archive/saves")
}

fn expand_home(raw: &str) -> PathBuf {
    match (raw.strip_prefix("~/"), dirs_next::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}

// ─── Loader ───────────────────────────────────────────────────────────────────

/// Read one layer from `path`.
///
/// Returns `Ok(None)` when the file does not exist, and an error when it
/// exists but cannot be read or is not valid TOML.
pub fn parse_partial(path: &Path) -> Result<Option<PartialConfig>> {
    if !path.exists() {
        return Ok(None);
    }

    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    toml::from_str(&text)
        .map(Some)
        .with_context(|| format!("parsing {}", path.display()))
}

/// Resolve the final config: defaults < config file < `overrides`.
///
/// `explicit` is the path given with `--config`.  When it is missing a warning
/// is printed; a missing implicit default file is silently ignored.
pub fn load(explicit: Option<&Path>, overrides: PartialConfig) -> Result<Config> {
    let file_layer = match explicit {
        Some(path) => parse_partial(path)?.unwrap_or_else(|| {
            crate::ui::warn(format!(
                "config file '{}' not found, using defaults",
                path.display()
            ));
            PartialConfig::default()
        }),
        None => match default_config_file() {
            Some(path) => parse_partial(&path)?.unwrap_or_default(),
            None => PartialConfig::default(),
        },
    };

    Ok(file_layer.merge(overrides).resolve())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
