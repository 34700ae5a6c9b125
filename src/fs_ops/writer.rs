//! Atomic write protocol:
//! - stage a uniquely named temp file beside the target
//! - copy the content source into it and fsync
//! - settle permission bits on the open handle (see `WriteOptions`)
//! - close, then atomically replace the target via `platform::replace_file`
//!
//! Every failure removes the temp file once and leaves the target untouched.
//! Nothing is retried; callers that want retries loop around this.

use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::debug;

use super::copier::{Copier, FnCopier, StreamCopier};
use super::helpers::is_not_found;
use super::options::WriteOptions;
use super::outcome::{TempDisposition, WriteOutcome};
use super::staged::StagedFile;
use crate::errors::AtomicWriteError;
use crate::platform;

/// Reusable writer: options plus the copy strategy.
#[derive(Debug, Clone)]
pub struct AtomicWriter<C = StreamCopier> {
    options: WriteOptions,
    copier: C,
}

impl AtomicWriter<StreamCopier> {
    pub fn new(options: WriteOptions) -> Self {
        Self {
            options,
            copier: StreamCopier::default(),
        }
    }
}

impl Default for AtomicWriter<StreamCopier> {
    fn default() -> Self {
        Self::new(WriteOptions::default())
    }
}

impl<C: Copier> AtomicWriter<C> {
    /// Swap the copy strategy.
    pub fn with_copier<D: Copier>(self, copier: D) -> AtomicWriter<D> {
        AtomicWriter {
            options: self.options,
            copier,
        }
    }

    /// Use a closure as the copy strategy, e.g. `|r, w| std::io::copy(r, w)`.
    pub fn with_copy_fn<F>(self, f: F) -> AtomicWriter<FnCopier<F>>
    where
        F: FnMut(&mut dyn Read, &mut dyn std::io::Write) -> std::io::Result<u64>,
    {
        self.with_copier(FnCopier::new(f))
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    /// Atomically replace `target` with everything `content` yields.
    pub fn write<P: AsRef<Path>, R: Read>(&mut self, target: P, mut content: R) -> WriteOutcome {
        let target = target.as_ref();
        let mut staged = match StagedFile::create(target) {
            Ok(s) => s,
            Err(e) => {
                debug!(
                    target = %target.display(),
                    phase = e.phase(),
                    error = %e,
                    "Atomic write failed"
                );
                return WriteOutcome::failed(e, TempDisposition::none());
            }
        };

        match self.stage_and_replace(target, &mut staged, &mut content) {
            Ok(()) => {
                debug!(target = %target.display(), "Replaced target atomically");
                WriteOutcome::succeeded(staged.release())
            }
            Err(e) => {
                debug!(
                    target = %target.display(),
                    temp = %staged.path().display(),
                    phase = e.phase(),
                    error = %e,
                    "Atomic write failed; discarding temp file"
                );
                WriteOutcome::failed(e, staged.release())
            }
        }
    }

    /// Simple form of [`AtomicWriter::write`].
    pub fn write_file<P: AsRef<Path>, R: Read>(
        &mut self,
        target: P,
        content: R,
    ) -> Result<(), AtomicWriteError> {
        self.write(target, content).into_result()
    }

    fn stage_and_replace(
        &mut self,
        target: &Path,
        staged: &mut StagedFile,
        content: &mut dyn Read,
    ) -> Result<(), AtomicWriteError> {
        let temp = staged.path().to_path_buf();

        // 1) populate
        let file = staged.handle().map_err(|source| AtomicWriteError::Write {
            temp: temp.clone(),
            source,
        })?;
        let bytes = self
            .copier
            .copy(content, &mut *file)
            .map_err(|source| AtomicWriteError::Write {
                temp: temp.clone(),
                source,
            })?;

        // 2) durability: the rename must never expose data that is not on disk yet
        file.sync_all().map_err(|source| AtomicWriteError::Sync {
            temp: temp.clone(),
            source,
        })?;
        debug!(temp = %temp.display(), bytes, "Temp file written and synced");

        // 3) permissions, fixed while the file is still private
        let existing = match fs::metadata(target) {
            Ok(meta) => platform::file_mode(&meta),
            Err(e) if is_not_found(&e) => None,
            Err(source) => {
                return Err(AtomicWriteError::Stat {
                    path: target.to_path_buf(),
                    temp: temp.clone(),
                    source,
                });
            }
        };
        let temp_meta = file.metadata().map_err(|source| AtomicWriteError::Stat {
            path: temp.clone(),
            temp: temp.clone(),
            source,
        })?;
        let temp_mode = platform::file_mode(&temp_meta);
        if let Some(mode) = self.options.resolve_mode(existing, temp_mode) {
            if Some(mode) != temp_mode {
                platform::set_file_mode(file, mode).map_err(|source| {
                    AtomicWriteError::SetPermissions {
                        temp: temp.clone(),
                        mode,
                        source,
                    }
                })?;
                debug!(temp = %temp.display(), mode = %format!("{mode:o}"), "Set temp file mode");
            }
        }

        // 4) close before the rename
        staged.close().map_err(|source| AtomicWriteError::Close {
            temp: temp.clone(),
            source,
        })?;

        // 5) replace
        platform::replace_file(&temp, target).map_err(|source| AtomicWriteError::Replace {
            temp,
            target: target.to_path_buf(),
            source,
        })
    }
}

/// Atomically replace `path` with the contents of `content`.
///
/// After this returns `Ok`, `path` holds exactly the bytes read from `content`;
/// after `Err`, `path` is exactly as it was before the call.
pub fn write_file<P: AsRef<Path>, R: Read>(
    path: P,
    content: R,
    options: &WriteOptions,
) -> Result<(), AtomicWriteError> {
    AtomicWriter::new(*options).write_file(path, content)
}

/// Like [`write_file`] but reports temp-file disposition as well.
pub fn write_file_outcome<P: AsRef<Path>, R: Read>(
    path: P,
    content: R,
    options: &WriteOptions,
) -> WriteOutcome {
    AtomicWriter::new(*options).write(path, content)
}

/// Convenience wrapper for in-memory content.
pub fn write_bytes<P: AsRef<Path>, B: AsRef<[u8]>>(
    path: P,
    bytes: B,
    options: &WriteOptions,
) -> Result<(), AtomicWriteError> {
    write_file(path, bytes.as_ref(), options)
}
