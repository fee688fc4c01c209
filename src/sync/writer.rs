//! Change-driven unit file writes
//!
//! A unit file is only rewritten when its directives differ from the
//! desired content. The comparison is per section and key, as sets.

use std::fs;
use std::io::{ErrorKind, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use crate::units::UnitFile;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Result of synchronizing one unit file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// On-disk content already matches
    Unchanged,
    /// File was (re)written
    Written,
    /// Dry run: the content that would have been written
    Pending(String),
}

impl SyncStatus {
    pub fn changed(&self) -> bool {
        !matches!(self, SyncStatus::Unchanged)
    }
}

/// True if `path` is missing or holds different directives than `desired`
pub fn needs_update(path: &Path, desired: &UnitFile) -> bool {
    match fs::read_to_string(path) {
        Ok(existing) => !desired.matches(&existing),
        Err(e) if e.kind() == ErrorKind::NotFound => true,
        Err(e) => {
            log::warn!("Cannot read {}: {}, rewriting", path.display(), e);
            true
        }
    }
}

/// Bring the file at `path` in line with `desired`
///
/// Stale files for units no longer declared are never removed.
pub fn synchronize(path: &Path, desired: &UnitFile, dry_run: bool) -> Result<SyncStatus, SyncError> {
    if !needs_update(path, desired) {
        log::info!("Unit file not changed: {}", path.display());
        return Ok(SyncStatus::Unchanged);
    }

    let content = desired.to_string();
    if dry_run {
        log::debug!("Dry run, not writing {}", path.display());
        return Ok(SyncStatus::Pending(content));
    }

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| SyncError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    log::info!("Writing changed file: {}", path.display());
    write_atomic(path, content.as_bytes()).map_err(|source| SyncError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(SyncStatus::Written)
}

/// Write to a sibling temp file, then rename over the target
fn write_atomic(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| std::io::Error::new(ErrorKind::InvalidInput, "path has no file name"))?;
    let tmp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    let result = (|| {
        let mut file = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o644)
            .open(&tmp)?;
        file.write_all(content)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}
