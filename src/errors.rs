//! Typed error definitions for atomic_file.
//! One variant per protocol phase; each carries the offending path(s) and the
//! underlying OS error so callers can diagnose or clean up by hand.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::fs_ops::helpers::os_hint;

#[derive(Debug, Error)]
pub enum AtomicWriteError {
    #[error("cannot create temp file in '{}': {source}{}", dir.display(), os_hint(source))]
    TempFileCreate { dir: PathBuf, source: io::Error },

    #[error("cannot write data to temp file '{}': {source}{}", temp.display(), os_hint(source))]
    Write { temp: PathBuf, source: io::Error },

    #[error("cannot flush temp file '{}': {source}{}", temp.display(), os_hint(source))]
    Sync { temp: PathBuf, source: io::Error },

    #[error("cannot stat '{}': {source}{}", path.display(), os_hint(source))]
    Stat {
        path: PathBuf,
        temp: PathBuf,
        source: io::Error,
    },

    #[error(
        "cannot set mode {mode:#o} on temp file '{}': {source}{}",
        temp.display(),
        os_hint(source)
    )]
    SetPermissions {
        temp: PathBuf,
        mode: u32,
        source: io::Error,
    },

    #[error("cannot close temp file '{}': {source}{}", temp.display(), os_hint(source))]
    Close { temp: PathBuf, source: io::Error },

    #[error(
        "cannot replace '{}' with temp file '{}': {source}{}",
        target.display(),
        temp.display(),
        os_hint(source)
    )]
    Replace {
        temp: PathBuf,
        target: PathBuf,
        source: io::Error,
    },
}

impl AtomicWriteError {
    /// Short, stable name of the phase that failed (used as a log field).
    pub fn phase(&self) -> &'static str {
        match self {
            AtomicWriteError::TempFileCreate { .. } => "create",
            AtomicWriteError::Write { .. } => "write",
            AtomicWriteError::Sync { .. } => "sync",
            AtomicWriteError::Stat { .. } => "stat",
            AtomicWriteError::SetPermissions { .. } => "set_permissions",
            AtomicWriteError::Close { .. } => "close",
            AtomicWriteError::Replace { .. } => "replace",
        }
    }

    /// Stable numeric code per phase, suitable for exit statuses and log fields.
    pub fn code(&self) -> i32 {
        match self {
            AtomicWriteError::TempFileCreate { .. } => 10,
            AtomicWriteError::Write { .. } => 11,
            AtomicWriteError::Sync { .. } => 12,
            AtomicWriteError::Stat { .. } => 13,
            AtomicWriteError::SetPermissions { .. } => 14,
            AtomicWriteError::Close { .. } => 15,
            AtomicWriteError::Replace { .. } => 16,
        }
    }

    /// The underlying OS error.
    pub fn io_error(&self) -> &io::Error {
        match self {
            AtomicWriteError::TempFileCreate { source, .. }
            | AtomicWriteError::Write { source, .. }
            | AtomicWriteError::Sync { source, .. }
            | AtomicWriteError::Stat { source, .. }
            | AtomicWriteError::SetPermissions { source, .. }
            | AtomicWriteError::Close { source, .. }
            | AtomicWriteError::Replace { source, .. } => source,
        }
    }

    /// Temp file involved in the failure, if one had been created.
    pub fn temp_path(&self) -> Option<&Path> {
        match self {
            AtomicWriteError::TempFileCreate { .. } => None,
            AtomicWriteError::Write { temp, .. }
            | AtomicWriteError::Stat { temp, .. }
            | AtomicWriteError::Sync { temp, .. }
            | AtomicWriteError::SetPermissions { temp, .. }
            | AtomicWriteError::Close { temp, .. }
            | AtomicWriteError::Replace { temp, .. } => Some(temp),
        }
    }
}
