//! Core library for `atomic_file`.
//!
//! Atomically replace a file's contents. After a call returns, the target
//! holds either the full new content (with the intended permission bits) or
//! exactly what it held before; readers polling the path never observe a
//! partial or empty file.
//!
//! ```no_run
//! use atomic_file::{write_file, WriteOptions};
//!
//! let opts = WriteOptions::new().default_file_mode(0o644);
//! write_file("state.json", &b"{\"ok\":true}"[..], &opts)?;
//! # Ok::<(), atomic_file::AtomicWriteError>(())
//! ```
//!
//! The rename is only atomic when the temp file and the target share a
//! filesystem, which is why the temp file is always created beside the target.
//! Directory-entry durability (fsync of the parent) is not provided.

pub mod cli;
pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod output;
pub mod platform;

pub use config::{Config, LogLevel, default_config_path, path_has_symlink_ancestor};
pub use errors::AtomicWriteError;
pub use fs_ops::{
    AtomicWriter, Copier, FnCopier, StreamCopier, WriteOptions, WriteOutcome, parse_mode,
    write_bytes, write_file, write_file_outcome,
};
