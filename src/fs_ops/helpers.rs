//! I/O error hint helpers.
//!
//! Turns a raw `io::Error` into a short, actionable suffix for error messages.
//! Used by the `Display` impl of `AtomicWriteError` so every phase failure
//! ends with the hint and the raw OS code when one is known.

use std::io;

/// Platform-aware hint for a raw OS error code.
#[cfg(unix)]
fn hint_for_code(code: i32) -> Option<&'static str> {
    match code {
        libc::EACCES | libc::EPERM => {
            Some("permission denied; check ownership and write permissions on the directory")
        }
        libc::EXDEV => Some("cross-filesystem; temp file and target must share a filesystem"),
        libc::EBUSY => Some("resource busy; ensure no other process holds the target"),
        libc::ENOENT => Some("path not found; verify the parent directory exists"),
        libc::EISDIR => Some("target is a directory; only regular files can be replaced"),
        libc::ENOSPC => Some("insufficient space on device"),
        libc::EDQUOT => Some("disk quota exceeded"),
        libc::EROFS => Some("read-only filesystem; cannot write here"),
        libc::ELOOP => Some("too many symbolic link levels; possible symlink cycle"),
        libc::ENAMETOOLONG => Some("filename or path too long; shorten path segments"),
        libc::EMFILE => Some("process file descriptor limit reached"),
        libc::ENFILE => Some("system-wide file table overflow"),
        _ => None,
    }
}

/// Common Win32 errors.
#[cfg(windows)]
fn hint_for_code(code: i32) -> Option<&'static str> {
    match code {
        // ERROR_ACCESS_DENIED
        5 => Some("access denied; check permissions"),
        // ERROR_NOT_SAME_DEVICE
        17 => Some("not same device; temp file and target must share a volume"),
        // ERROR_SHARING_VIOLATION
        32 => Some("sharing violation; the target is open in another process"),
        2 | 3 => Some("path not found; verify the parent directory exists"),
        112 => Some("insufficient disk space"), // ERROR_DISK_FULL
        19 => Some("write protected / read-only media"), // ERROR_WRITE_PROTECT
        206 => Some("filename or path too long (MAX_PATH exceeded)"),
        _ => None,
    }
}

#[cfg(not(any(unix, windows)))]
fn hint_for_code(_code: i32) -> Option<&'static str> {
    None
}

fn hint_for_kind(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::PermissionDenied => {
            Some("permission denied; check ownership and write permissions on the directory")
        }
        io::ErrorKind::NotFound => Some("path not found; verify the parent directory exists"),
        io::ErrorKind::AlreadyExists => Some("already exists"),
        io::ErrorKind::WriteZero => Some("device refused more data"),
        _ => None,
    }
}

/// Suffix appended to phase error messages. Empty when nothing useful can be said.
pub(crate) fn os_hint(e: &io::Error) -> String {
    match e.raw_os_error() {
        Some(code) => match hint_for_code(code) {
            Some(h) => format!(" — {h} [os code: {code}]"),
            None => format!(" [os code: {code}]"),
        },
        None => hint_for_kind(e.kind())
            .map(|h| format!(" — {h}"))
            .unwrap_or_default(),
    }
}

/// True when a removal error just means the file is already gone.
#[inline]
pub(crate) fn is_not_found(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::NotFound
}
