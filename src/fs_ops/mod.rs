//! Filesystem operations: the atomic write protocol and its pieces.

mod copier;
pub(crate) mod helpers;
mod options;
mod outcome;
mod staged;
mod writer;

pub use copier::{Copier, DEFAULT_BUF_SIZE, FnCopier, StreamCopier};
pub use options::{MODE_MASK, WriteOptions, parse_mode};
pub use outcome::WriteOutcome;
pub use writer::{AtomicWriter, write_bytes, write_file, write_file_outcome};
