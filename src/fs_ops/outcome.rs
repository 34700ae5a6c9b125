//! Terminal result of one atomic write, including temp-file disposition.
//!
//! A failed cleanup never replaces the primary error: it is recorded here so a
//! caller (or an operator reading the logs) can remove the stray file by hand.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use super::helpers::is_not_found;
use crate::errors::AtomicWriteError;

/// What happened to the temp file after the write finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TempDisposition {
    pub(crate) deleted: bool,
    pub(crate) leaked: Option<PathBuf>,
}

impl TempDisposition {
    /// Nothing was ever created.
    pub(crate) fn none() -> Self {
        Self {
            deleted: true,
            leaked: None,
        }
    }
}

/// Remove `path` once. Already gone counts as success.
pub(crate) fn remove_temp(path: &Path) -> TempDisposition {
    match fs::remove_file(path) {
        Ok(()) => TempDisposition::none(),
        Err(e) if is_not_found(&e) => TempDisposition::none(),
        Err(e) => {
            warn!(
                temp = %path.display(),
                error = %e,
                "Could not remove temp file; it needs manual cleanup"
            );
            TempDisposition {
                deleted: false,
                leaked: Some(path.to_path_buf()),
            }
        }
    }
}

/// Outcome of `write_file_outcome` / `AtomicWriter::write`.
#[derive(Debug)]
pub struct WriteOutcome {
    /// `None` on success.
    pub error: Option<AtomicWriteError>,
    /// Path of a temp file that still exists (cleanup failed); `None` otherwise.
    pub temp_path: Option<PathBuf>,
    /// False only when a temp file was left behind.
    pub temp_deleted: bool,
}

impl WriteOutcome {
    pub(crate) fn succeeded(disposition: TempDisposition) -> Self {
        Self {
            error: None,
            temp_path: disposition.leaked,
            temp_deleted: disposition.deleted,
        }
    }

    pub(crate) fn failed(error: AtomicWriteError, disposition: TempDisposition) -> Self {
        Self {
            error: Some(error),
            temp_path: disposition.leaked,
            temp_deleted: disposition.deleted,
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Collapse into the simple form, dropping temp-file bookkeeping.
    pub fn into_result(self) -> Result<(), AtomicWriteError> {
        match self.error {
            None => Ok(()),
            Some(e) => Err(e),
        }
    }
}
