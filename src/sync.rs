//! Copying entry trees between their live location and the archive.
//!
//! Everything here is built on one primitive, [`merge_copy`]: a recursive
//! copy that creates missing directories, rewrites a destination file only
//! when its size differs or the source is newer, and never deletes files that
//! exist only at the destination.  Only directories and regular files are
//! copied; sockets, FIFOs, device nodes and dangling symlinks are skipped with
//! a warning.
//!
//! | Operation          | Direction                          | Afterwards            |
//! |--------------------|------------------------------------|-----------------------|
//! | [`SyncEngine::backup`]  | `path` → `<archive>/<name>`   | entry unchanged       |
//! | [`SyncEngine::restore`] | `<archive>/<name>` → `path`   | entry active          |
//! | [`SyncEngine::freeze`]  | backup, then delete `path`    | entry inactive        |
//!
//! Copies are not transactional.  A failure part-way leaves whatever was
//! already written in place.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use thiserror::Error;
use walkdir::WalkDir;

use crate::entry::Entry;

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SyncError {
    /// A directory the operation depends on is absent.
    #[error("{} does not exist", path.display())]
    PathNotFound { path: PathBuf },

    /// A destination directory could not be created.
    #[error("cannot create {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading, walking, or writing failed during a merge-copy.
    #[error("copy failed at {}: {source}", path.display())]
    Copy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The source tree could not be deleted after a freeze.
    #[error("cannot remove {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn copy_err(path: impl Into<PathBuf>, source: io::Error) -> SyncError {
    SyncError::Copy {
        path: path.into(),
        source,
    }
}

// ─── Outcomes ─────────────────────────────────────────────────────────────────

/// What a merge-copy did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CopyStats {
    pub files_copied: usize,
    pub files_unchanged: usize,
    pub dirs_created: usize,
    /// Special files and dangling symlinks left out of the copy.
    pub skipped: usize,
}

/// Why a backup did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Inactive,
    SourceMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupOutcome {
    Copied(CopyStats),
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreezeOutcome {
    pub backup: BackupOutcome,
    /// `false` when the source was already gone.
    pub removed_source: bool,
}

// ─── Engine ───────────────────────────────────────────────────────────────────

/// Runs backup, restore, and freeze against a single archive root.
#[derive(Debug, Clone)]
pub struct SyncEngine {
    archive_root: PathBuf,
}

impl SyncEngine {
    pub fn new(archive_root: impl Into<PathBuf>) -> Self {
        Self {
            archive_root: archive_root.into(),
        }
    }

    pub fn archive_root(&self) -> &Path {
        &self.archive_root
    }

    /// Where `entry` is archived: `<archive_root>/<name>`.
    pub fn archive_dir(&self, entry: &Entry) -> PathBuf {
        self.archive_root.join(&entry.name)
    }

    /// Copy the entry's source tree into its archive directory.
    ///
    /// Inactive entries and missing sources are skips, not errors.  The
    /// archive root must already exist; only the per-entry directory is
    /// created here, so an unmounted archive is reported instead of being
    /// silently filled on the local disk.
    pub fn backup(&self, entry: &Entry) -> Result<BackupOutcome, SyncError> {
        if !entry.active {
            tracing::debug!("{}: inactive, not backing up", entry.name);
            return Ok(BackupOutcome::Skipped(SkipReason::Inactive));
        }

        let source = Path::new(&entry.path);
        if !source.exists() {
            tracing::debug!("{}: source {} missing", entry.name, source.display());
            return Ok(BackupOutcome::Skipped(SkipReason::SourceMissing));
        }

        if !self.archive_root.is_dir() {
            return Err(SyncError::PathNotFound {
                path: self.archive_root.clone(),
            });
        }

        let destination = self.archive_dir(entry);
        if !destination.exists() {
            fs::create_dir(&destination).map_err(|source| SyncError::CreateDir {
                path: destination.clone(),
                source,
            })?;
        }

        let stats = merge_copy(source, &destination)?;
        tracing::info!(
            "{}: backed up {} file(s), {} unchanged, {} new dir(s), {} skipped",
            entry.name,
            stats.files_copied,
            stats.files_unchanged,
            stats.dirs_created,
            stats.skipped
        );
        Ok(BackupOutcome::Copied(stats))
    }

    /// Copy the archived tree back to the entry's source path and re-activate
    /// it.  `active` is left alone if anything fails.
    pub fn restore(&self, entry: &mut Entry) -> Result<CopyStats, SyncError> {
        let archived = self.archive_dir(entry);
        if !archived.is_dir() {
            return Err(SyncError::PathNotFound { path: archived });
        }

        let target = PathBuf::from(&entry.path);
        fs::create_dir_all(&target).map_err(|source| SyncError::CreateDir {
            path: target.clone(),
            source,
        })?;

        let stats = merge_copy(&archived, &target)?;
        entry.active = true;
        tracing::info!("{}: restored {} file(s)", entry.name, stats.files_copied);
        Ok(stats)
    }

    /// Back the entry up, delete its source tree, and deactivate it.
    ///
    /// A backup that fails with an error stops the freeze before anything is
    /// deleted.  A skipped backup (inactive entry, missing source) does not:
    /// the source is removed if present and the entry is still deactivated.
    pub fn freeze(&self, entry: &mut Entry) -> Result<FreezeOutcome, SyncError> {
        let backup = self.backup(entry)?;

        let source = PathBuf::from(&entry.path);
        let remove_err = |e: io::Error| SyncError::Remove {
            path: source.clone(),
            source: e,
        };
        let removed_source = match fs::symlink_metadata(&source) {
            Err(e) if e.kind() == io::ErrorKind::NotFound => false,
            Err(e) => return Err(remove_err(e)),
            Ok(meta) if meta.is_dir() => {
                fs::remove_dir_all(&source).map_err(remove_err)?;
                true
            },
            Ok(_) => {
                fs::remove_file(&source).map_err(remove_err)?;
                true
            },
        };

        entry.active = false;
        tracing::info!("{}: frozen (source removed: {removed_source})", entry.name);
        Ok(FreezeOutcome {
            backup,
            removed_source,
        })
    }
}

// ─── Merge-copy ───────────────────────────────────────────────────────────────

/// Recursively copy `src` onto `dst`, following symlinks in `src`.
///
/// A single regular file as `src` is copied to `dst/<file name>`.
pub fn merge_copy(src: &Path, dst: &Path) -> Result<CopyStats, SyncError> {
    let mut stats = CopyStats::default();

    if !src.exists() {
        return Err(SyncError::PathNotFound {
            path: src.to_path_buf(),
        });
    }

    if !dst.exists() {
        fs::create_dir_all(dst).map_err(|source| SyncError::CreateDir {
            path: dst.to_path_buf(),
            source,
        })?;
        stats.dirs_created += 1;
    }

    if src.is_file() {
        let name = src.file_name().unwrap_or(src.as_os_str());
        copy_file(src, &dst.join(name), &mut stats)?;
        return Ok(stats);
    }

    for item in WalkDir::new(src).min_depth(1).follow_links(true) {
        let item = match item {
            Ok(item) => item,
            Err(e) if is_dangling_link(&e) => {
                let path = e.path().unwrap_or(src);
                tracing::warn!("skipping dangling symlink {}", path.display());
                stats.skipped += 1;
                continue;
            },
            Err(e) => {
                let path = e.path().unwrap_or(src).to_path_buf();
                return Err(copy_err(path, e.into()));
            },
        };

        let relative = item
            .path()
            .strip_prefix(src)
            .map_err(|e| copy_err(item.path(), io::Error::other(e)))?;
        let target = dst.join(relative);

        let file_type = item.file_type();
        if file_type.is_dir() {
            if !target.is_dir() {
                fs::create_dir(&target).map_err(|e| copy_err(&target, e))?;
                stats.dirs_created += 1;
            }
        } else if file_type.is_file() {
            copy_file(item.path(), &target, &mut stats)?;
        } else {
            // Opening a FIFO for reading would block until a writer shows up.
            tracing::warn!("skipping special file {}", item.path().display());
            stats.skipped += 1;
        }
    }

    Ok(stats)
}

/// A symlink whose target does not exist.  Loops and unreadable directories
/// are still errors.
fn is_dangling_link(err: &walkdir::Error) -> bool {
    let not_found = err
        .io_error()
        .is_some_and(|e| e.kind() == io::ErrorKind::NotFound);
    let is_link = err
        .path()
        .and_then(|p| fs::symlink_metadata(p).ok())
        .is_some_and(|meta| meta.file_type().is_symlink());
    err.loop_ancestor().is_none() && not_found && is_link
}

fn copy_file(from: &Path, to: &Path, stats: &mut CopyStats) -> Result<(), SyncError> {
    if needs_copy(from, to)? {
        fs::copy(from, to).map_err(|e| copy_err(to, e))?;
        tracing::debug!("copied {} → {}", from.display(), to.display());
        stats.files_copied += 1;
    } else {
        stats.files_unchanged += 1;
    }
    Ok(())
}

/// A destination file is stale when it is missing, has a different size, or
/// is older than the source.
fn needs_copy(from: &Path, to: &Path) -> Result<bool, SyncError> {
    let dst_meta = match fs::metadata(to) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(true),
        Err(e) => return Err(copy_err(to, e)),
    };
    let src_meta = fs::metadata(from).map_err(|e| copy_err(from, e))?;

    if !dst_meta.is_file() || src_meta.len() != dst_meta.len() {
        return Ok(true);
    }

    let modified = |meta: &fs::Metadata, path: &Path| -> Result<SystemTime, SyncError> {
        meta.modified().map_err(|e| copy_err(path, e))
    };
    Ok(modified(&src_meta, from)? > modified(&dst_meta, to)?)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    /// Archive root plus a populated source tree, all under one temp dir.
    struct Fixture {
        _root: tempfile::TempDir,
        archive: PathBuf,
        source: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let root = tempfile::tempdir().unwrap();
            let archive = root.path().join("archive");
            let source = root.path().join("games");
            fs::create_dir_all(&archive).unwrap();
            fs::create_dir_all(source.join("saves").join("slot1")).unwrap();
            fs::write(source.join("config.ini"), "fullscreen=1").unwrap();
            fs::write(source.join("saves").join("slot1").join("save.dat"), [1u8, 2, 3]).unwrap();
            Self {
                _root: root,
                archive,
                source,
            }
        }

        fn engine(&self) -> SyncEngine {
            SyncEngine::new(&self.archive)
        }

        fn entry(&self) -> Entry {
            Entry::new("games", self.source.to_str().unwrap()).unwrap()
        }
    }

    // ── merge_copy ────────────────────────────────────────────────────────────

    #[test]
    fn merge_copy_creates_destination_and_mirrors_tree() {
        let fx = Fixture::new();
        let dst = fx.archive.join("fresh");
        let stats = merge_copy(&fx.source, &dst).unwrap();

        assert_eq!(stats.files_copied, 2);
        assert_eq!(fs::read_to_string(dst.join("config.ini")).unwrap(), "fullscreen=1");
        assert_eq!(
            fs::read(dst.join("saves").join("slot1").join("save.dat")).unwrap(),
            vec![1u8, 2, 3]
        );
    }

    #[test]
    fn merge_copy_is_idempotent() {
        let fx = Fixture::new();
        let dst = fx.archive.join("games");
        merge_copy(&fx.source, &dst).unwrap();
        let before = fs::read(dst.join("config.ini")).unwrap();

        let second = merge_copy(&fx.source, &dst).unwrap();
        assert_eq!(second.files_copied, 0);
        assert_eq!(second.files_unchanged, 2);
        assert_eq!(second.dirs_created, 0);
        assert_eq!(fs::read(dst.join("config.ini")).unwrap(), before);
    }

    #[test]
    fn merge_copy_overwrites_changed_files() {
        let fx = Fixture::new();
        let dst = fx.archive.join("games");
        merge_copy(&fx.source, &dst).unwrap();

        fs::write(fx.source.join("config.ini"), "fullscreen=0\nvsync=1").unwrap();
        let stats = merge_copy(&fx.source, &dst).unwrap();
        assert_eq!(stats.files_copied, 1);
        assert_eq!(
            fs::read_to_string(dst.join("config.ini")).unwrap(),
            "fullscreen=0\nvsync=1"
        );
    }

    #[test]
    fn merge_copy_keeps_destination_only_files() {
        let fx = Fixture::new();
        let dst = fx.archive.join("games");
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("old-save.dat"), "keep me").unwrap();

        merge_copy(&fx.source, &dst).unwrap();
        assert_eq!(fs::read_to_string(dst.join("old-save.dat")).unwrap(), "keep me");
    }

    #[test]
    fn merge_copy_missing_source_is_path_not_found() {
        let fx = Fixture::new();
        let err = merge_copy(&fx.archive.join("nope"), &fx.archive.join("dst")).unwrap_err();
        assert!(matches!(err, SyncError::PathNotFound { .. }));
    }

    #[test]
    fn merge_copy_surfaces_write_errors() {
        let fx = Fixture::new();
        let dst = fx.archive.join("games");
        fs::create_dir_all(&dst).unwrap();
        // A directory where a file should go cannot be overwritten by fs::copy.
        fs::create_dir_all(dst.join("config.ini")).unwrap();

        let err = merge_copy(&fx.source, &dst).unwrap_err();
        assert!(matches!(err, SyncError::Copy { .. }), "got {err:?}");
    }

    #[cfg(unix)]
    #[test]
    fn merge_copy_skips_fifos_instead_of_blocking() {
        let fx = Fixture::new();
        let status = std::process::Command::new("mkfifo")
            .arg(fx.source.join("pipe"))
            .status()
            .unwrap();
        assert!(status.success());

        let dst = fx.archive.join("games");
        let stats = merge_copy(&fx.source, &dst).unwrap();
        assert_eq!(stats.files_copied, 2);
        assert_eq!(stats.skipped, 1);
        assert!(fs::symlink_metadata(dst.join("pipe")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn merge_copy_skips_sockets() {
        let fx = Fixture::new();
        let _listener = std::os::unix::net::UnixListener::bind(fx.source.join("ctl.sock")).unwrap();

        let dst = fx.archive.join("games");
        let stats = merge_copy(&fx.source, &dst).unwrap();
        assert_eq!(stats.skipped, 1);
        assert!(fs::symlink_metadata(dst.join("ctl.sock")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn merge_copy_skips_dangling_symlinks() {
        let fx = Fixture::new();
        std::os::unix::fs::symlink("/nonexistent/sayve-target", fx.source.join("lock")).unwrap();

        let dst = fx.archive.join("games");
        let stats = merge_copy(&fx.source, &dst).unwrap();
        assert_eq!(stats.files_copied, 2);
        assert_eq!(stats.skipped, 1);
        assert!(fs::symlink_metadata(dst.join("lock")).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn merge_copy_follows_live_symlinks() {
        let fx = Fixture::new();
        std::os::unix::fs::symlink(fx.source.join("config.ini"), fx.source.join("link.ini"))
            .unwrap();

        let dst = fx.archive.join("games");
        merge_copy(&fx.source, &dst).unwrap();
        let copied = dst.join("link.ini");
        assert!(fs::symlink_metadata(&copied).unwrap().is_file());
        assert_eq!(fs::read_to_string(copied).unwrap(), "fullscreen=1");
    }

    // ── backup ────────────────────────────────────────────────────────────────

    #[test]
    fn backup_copies_into_per_entry_directory() {
        let fx = Fixture::new();
        let outcome = fx.engine().backup(&fx.entry()).unwrap();

        assert!(matches!(outcome, BackupOutcome::Copied(s) if s.files_copied == 2));
        // Contents land directly in <archive>/<name>, not <archive>/<name>/<name>.
        assert!(fx.archive.join("games").join("config.ini").is_file());
    }

    #[test]
    fn backup_skips_inactive_entries() {
        let fx = Fixture::new();
        let mut entry = fx.entry();
        entry.active = false;

        let outcome = fx.engine().backup(&entry).unwrap();
        assert_eq!(outcome, BackupOutcome::Skipped(SkipReason::Inactive));
        assert!(!fx.archive.join("games").exists());
    }

    #[test]
    fn backup_skips_missing_source() {
        let fx = Fixture::new();
        let entry = Entry::new("ghost", fx.archive.join("no-such-dir").to_str().unwrap()).unwrap();

        let outcome = fx.engine().backup(&entry).unwrap();
        assert_eq!(outcome, BackupOutcome::Skipped(SkipReason::SourceMissing));
        assert!(!fx.archive.join("ghost").exists());
    }

    #[test]
    fn backup_requires_existing_archive_root() {
        let fx = Fixture::new();
        let engine = SyncEngine::new(fx.archive.join("unmounted"));

        let err = engine.backup(&fx.entry()).unwrap_err();
        assert!(matches!(err, SyncError::PathNotFound { .. }));
        assert!(!fx.archive.join("unmounted").exists());
    }

    #[test]
    fn backup_twice_leaves_archive_unchanged() {
        let fx = Fixture::new();
        let engine = fx.engine();
        let entry = fx.entry();

        engine.backup(&entry).unwrap();
        let archived = fx.archive.join("games").join("config.ini");
        let mtime = fs::metadata(&archived).unwrap().modified().unwrap();

        let second = engine.backup(&entry).unwrap();
        assert!(matches!(second, BackupOutcome::Copied(s) if s.files_copied == 0));
        assert_eq!(fs::metadata(&archived).unwrap().modified().unwrap(), mtime);
    }

    #[cfg(unix)]
    #[test]
    fn freeze_succeeds_with_dangling_symlink_in_source() {
        let fx = Fixture::new();
        std::os::unix::fs::symlink("/nonexistent/sayve-target", fx.source.join("lock")).unwrap();
        let mut entry = fx.entry();

        let outcome = fx.engine().freeze(&mut entry).unwrap();
        assert!(matches!(outcome.backup, BackupOutcome::Copied(s) if s.skipped == 1));
        assert!(outcome.removed_source);
        assert!(!entry.active);
        assert!(fs::symlink_metadata(&fx.source).is_err());
    }

    // ── restore ───────────────────────────────────────────────────────────────

    #[test]
    fn restore_recreates_source_and_activates() {
        let fx = Fixture::new();
        let engine = fx.engine();
        let mut entry = fx.entry();
        engine.backup(&entry).unwrap();

        fs::remove_dir_all(&fx.source).unwrap();
        entry.active = false;

        let stats = engine.restore(&mut entry).unwrap();
        assert_eq!(stats.files_copied, 2);
        assert!(entry.active);
        assert!(fx.source.join("saves").join("slot1").join("save.dat").is_file());
    }

    #[test]
    fn restore_creates_deep_source_chain() {
        let fx = Fixture::new();
        let engine = fx.engine();
        engine.backup(&fx.entry()).unwrap();

        let deep = fx.archive.join("a").join("b").join("c");
        let mut entry = Entry::new("games", deep.to_str().unwrap()).unwrap();
        engine.restore(&mut entry).unwrap();
        assert!(deep.join("config.ini").is_file());
    }

    #[test]
    fn failed_restore_leaves_active_unchanged() {
        let fx = Fixture::new();
        let mut entry = fx.entry();
        entry.active = false;

        // Nothing was ever archived for this entry.
        let err = fx.engine().restore(&mut entry).unwrap_err();
        assert!(matches!(err, SyncError::PathNotFound { .. }));
        assert!(!entry.active);
    }

    #[test]
    fn restore_copy_failure_leaves_active_unchanged() {
        let fx = Fixture::new();
        let engine = fx.engine();
        let mut entry = fx.entry();
        engine.backup(&entry).unwrap();
        entry.active = false;

        // A directory now sits where the archived file has to land.
        fs::remove_file(fx.source.join("config.ini")).unwrap();
        fs::create_dir(fx.source.join("config.ini")).unwrap();

        let err = engine.restore(&mut entry).unwrap_err();
        assert!(matches!(err, SyncError::Copy { .. }), "got {err:?}");
        assert!(!entry.active);
    }

    // ── freeze ────────────────────────────────────────────────────────────────

    #[test]
    fn freeze_backs_up_then_deletes_source() {
        let fx = Fixture::new();
        let mut entry = fx.entry();

        let outcome = fx.engine().freeze(&mut entry).unwrap();
        assert!(outcome.removed_source);
        assert!(matches!(outcome.backup, BackupOutcome::Copied(_)));
        assert!(!entry.active);
        assert!(!fx.source.exists());
        assert!(fx.archive.join("games").join("config.ini").is_file());
    }

    #[test]
    fn freeze_with_missing_source_still_deactivates() {
        let fx = Fixture::new();
        fs::remove_dir_all(&fx.source).unwrap();
        let mut entry = fx.entry();

        let outcome = fx.engine().freeze(&mut entry).unwrap();
        assert_eq!(outcome.backup, BackupOutcome::Skipped(SkipReason::SourceMissing));
        assert!(!outcome.removed_source);
        assert!(!entry.active);
    }

    #[test]
    fn freeze_keeps_source_when_backup_fails() {
        let fx = Fixture::new();
        let engine = SyncEngine::new(fx.archive.join("unmounted"));
        let mut entry = fx.entry();

        assert!(engine.freeze(&mut entry).is_err());
        assert!(entry.active);
        assert!(fx.source.join("config.ini").is_file());
    }
}
