//! Windows implementations of platform helpers (best-effort, minimal ACL awareness).
//!
//! Notes:
//! - Windows lacks POSIX mode semantics; mode helpers are no-ops.
//! - Replace uses MoveFileExW(MOVEFILE_REPLACE_EXISTING). When that is refused
//!   (some filesystems and network shares reject replace-over-existing) we fall
//!   back to delete-then-rename. That fallback has a short window in which the
//!   target does not exist; it is a platform limitation, not a protocol one.

use std::ffi::OsStr;
use std::fs::{self, File, Metadata, OpenOptions};
use std::io;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use windows_sys::Win32::Storage::FileSystem::{
    MOVEFILE_REPLACE_EXISTING, MOVEFILE_WRITE_THROUGH, MoveFileExW,
};

const ERROR_ACCESS_DENIED: i32 = 5;

fn to_wide(s: &OsStr) -> Vec<u16> {
    s.encode_wide().chain(std::iter::once(0)).collect()
}

fn move_replace(src: &Path, dst: &Path) -> io::Result<()> {
    let src_w = to_wide(src.as_os_str());
    let dst_w = to_wide(dst.as_os_str());
    let ok = unsafe {
        MoveFileExW(
            src_w.as_ptr(),
            dst_w.as_ptr(),
            MOVEFILE_REPLACE_EXISTING | MOVEFILE_WRITE_THROUGH,
        )
    };
    if ok == 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

/// Replace `dst` with `src`.
pub fn replace_file(src: &Path, dst: &Path) -> io::Result<()> {
    match move_replace(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.raw_os_error() == Some(ERROR_ACCESS_DENIED) && dst.is_file() => {
            // Delete-then-rename fallback. Not atomic: the target is briefly absent.
            if let Err(rm) = fs::remove_file(dst) {
                if rm.kind() != io::ErrorKind::NotFound {
                    return Err(e);
                }
            }
            fs::rename(src, dst)
        }
        Err(e) => Err(e),
    }
}

/// No POSIX mode bits on Windows.
pub fn file_mode(_meta: &Metadata) -> Option<u32> {
    None
}

/// No-op on Windows; POSIX-style file modes are not applicable.
pub fn set_file_mode(_file: &File, _mode: u32) -> io::Result<()> {
    Ok(())
}

/// Close `file`. Windows reports no useful close errors through std, so this is a drop.
pub fn close_file(file: File) -> io::Result<()> {
    drop(file);
    Ok(())
}

/// Create a brand-new file (fails if anything exists at `path`).
pub fn create_temp_exclusive(path: &Path) -> io::Result<File> {
    OpenOptions::new().write(true).create_new(true).open(path)
}

/// Open log file for appending (best-effort; no symlink defense available via std on Windows).
pub fn open_log_file_secure_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// No-op on Windows; POSIX-style directory modes are not applicable.
pub fn set_dir_mode_0700(_path: &Path) -> io::Result<()> {
    Ok(())
}
