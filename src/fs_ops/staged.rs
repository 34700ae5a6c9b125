//! Staged temp file: the scratch sibling a write populates before the rename.
//!
//! `StagedFile` owns both the path and the open handle. While armed, dropping it
//! removes the temp file, so an early return or a panicking copier cannot leak
//! it. `release` disarms the guard and reports what happened to the file.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

use super::outcome::{TempDisposition, remove_temp};
use crate::errors::AtomicWriteError;
use crate::platform::{self, temp};

/// Bound on fresh-name attempts when a generated name already exists.
const MAX_CREATE_ATTEMPTS: u32 = 8;

#[derive(Debug)]
pub(crate) struct StagedFile {
    path: PathBuf,
    file: Option<File>,
    armed: bool,
}

impl StagedFile {
    /// Create a uniquely named, empty temp file next to `target`.
    pub(crate) fn create(target: &Path) -> Result<Self, AtomicWriteError> {
        let dir = temp::sibling_dir(target);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let path = temp::tmp_sibling_name(target);
            match platform::create_temp_exclusive(&path) {
                Ok(file) => {
                    debug!(temp = %path.display(), "Created temp file");
                    return Ok(Self {
                        path,
                        file: Some(file),
                        armed: true,
                    });
                }
                Err(e)
                    if e.kind() == io::ErrorKind::AlreadyExists
                        && attempt < MAX_CREATE_ATTEMPTS =>
                {
                    trace!(temp = %path.display(), attempt, "Temp name taken; retrying");
                }
                Err(source) => {
                    return Err(AtomicWriteError::TempFileCreate {
                        dir: dir.to_path_buf(),
                        source,
                    });
                }
            }
        }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// The open handle; errors once `close` has run.
    pub(crate) fn handle(&mut self) -> io::Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("temp file handle already closed"))
    }

    /// Close the handle. Idempotent: a second call is a no-op.
    pub(crate) fn close(&mut self) -> io::Result<()> {
        match self.file.take() {
            Some(f) => platform::close_file(f),
            None => Ok(()),
        }
    }

    /// Disarm the guard and make one removal attempt.
    ///
    /// After a successful replace the temp name no longer exists and this is a
    /// cheap NotFound; on failure paths it is the real cleanup.
    pub(crate) fn release(mut self) -> TempDisposition {
        // Drop the handle first; Windows refuses to delete open files.
        self.file.take();
        self.armed = false;
        remove_temp(&self.path)
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        if self.armed {
            self.file.take();
            let _ = remove_temp(&self.path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn create_places_temp_next_to_target() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("config.toml");
        let staged = StagedFile::create(&target).unwrap();
        assert_eq!(staged.path().parent(), Some(dir.path()));
        assert!(temp::is_tmp_sibling_of(&target, staged.path().file_name().unwrap()));
        assert!(staged.path().exists());
        let _ = staged.release();
    }

    #[test]
    fn create_in_missing_dir_reports_dir() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("missing").join("x");
        let err = StagedFile::create(&target).unwrap_err();
        match err {
            AtomicWriteError::TempFileCreate { dir: d, source } => {
                assert_eq!(d, dir.path().join("missing"));
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn drop_removes_armed_temp() {
        let dir = tempdir().unwrap();
        let path = {
            let mut staged = StagedFile::create(&dir.path().join("a")).unwrap();
            staged.handle().unwrap().write_all(b"partial").unwrap();
            staged.path().to_path_buf()
        };
        assert!(!path.exists(), "armed temp should be removed on drop");
    }

    #[test]
    fn close_is_idempotent_and_handle_errors_after() {
        let dir = tempdir().unwrap();
        let mut staged = StagedFile::create(&dir.path().join("b")).unwrap();
        staged.close().unwrap();
        staged.close().unwrap();
        assert!(staged.handle().is_err());
        let d = staged.release();
        assert!(d.deleted);
    }

    #[test]
    fn release_after_consumption_is_clean() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("c");
        let mut staged = StagedFile::create(&target).unwrap();
        staged.close().unwrap();
        fs::rename(staged.path(), &target).unwrap();
        let d = staged.release();
        assert!(d.deleted);
        assert!(d.leaked.is_none());
        assert!(target.exists());
    }
}
