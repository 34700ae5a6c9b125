//! Copy strategies used to populate the temp file.
//!
//! The writer only needs "move every byte from this reader into that writer".
//! `StreamCopier` is the default (buffered `io::copy`); callers with special
//! needs (progress reporting, hashing, throttling) can plug in their own
//! `Copier` or a plain closure via `AtomicWriter::with_copy_fn`.

use std::fmt;
use std::io::{self, BufWriter, Read, Write};

/// Default write buffer size.
pub const DEFAULT_BUF_SIZE: usize = 64 * 1024;

/// Moves the content source into the temp file.
///
/// Implementations must either copy the whole stream or return an error; the
/// writer treats any error as "abort and discard the temp file".
pub trait Copier {
    fn copy(&mut self, reader: &mut dyn Read, writer: &mut dyn Write) -> io::Result<u64>;
}

/// Buffered streaming copy. Flushes its buffer before returning.
#[derive(Debug, Clone, Copy)]
pub struct StreamCopier {
    buf_size: usize,
}

impl StreamCopier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a write buffer of `buf_size` bytes (minimum 1).
    pub fn with_buf_size(buf_size: usize) -> Self {
        Self {
            buf_size: buf_size.max(1),
        }
    }

    pub fn buf_size(&self) -> usize {
        self.buf_size
    }
}

impl Default for StreamCopier {
    fn default() -> Self {
        Self {
            buf_size: DEFAULT_BUF_SIZE,
        }
    }
}

impl Copier for StreamCopier {
    fn copy(&mut self, reader: &mut dyn Read, writer: &mut dyn Write) -> io::Result<u64> {
        let mut buffered = BufWriter::with_capacity(self.buf_size, writer);
        let bytes = io::copy(reader, &mut buffered)?;
        buffered.flush()?;
        Ok(bytes)
    }
}

/// Adapter turning a closure into a `Copier`.
pub struct FnCopier<F>(F);

impl<F> FnCopier<F>
where
    F: FnMut(&mut dyn Read, &mut dyn Write) -> io::Result<u64>,
{
    pub fn new(f: F) -> Self {
        FnCopier(f)
    }
}

impl<F> Copier for FnCopier<F>
where
    F: FnMut(&mut dyn Read, &mut dyn Write) -> io::Result<u64>,
{
    fn copy(&mut self, reader: &mut dyn Read, writer: &mut dyn Write) -> io::Result<u64> {
        (self.0)(reader, writer)
    }
}

impl<F> fmt::Debug for FnCopier<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnCopier(..)")
    }
}
