//! Platform-specific helpers.
//! This module hides OS differences (Unix/Windows) behind a uniform API so
//! the write protocol in `fs_ops` stays free of platform conditionals.
//!
//! The key collaborator is [`replace_file`]: "make `dst` be the file at `src`".

pub mod temp;

#[cfg(unix)]
mod unix;
#[cfg(not(unix))]
mod windows;

#[cfg(unix)]
pub use unix::{
    close_file, create_temp_exclusive, file_mode, open_log_file_secure_append, replace_file,
    set_dir_mode_0700, set_file_mode,
};

#[cfg(not(unix))]
pub use windows::{
    close_file, create_temp_exclusive, file_mode, open_log_file_secure_append, replace_file,
    set_dir_mode_0700, set_file_mode,
};
