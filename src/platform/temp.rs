//! Shared temporary name helpers.
//! Provides unique sibling filenames for atomic writes.
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static COUNTER: AtomicU64 = AtomicU64::new(0);

const TMP_SUFFIX: &str = ".tmp";

/// Directory a sibling temp file for `target` lives in. Bare file names map to ".".
pub fn sibling_dir(target: &Path) -> &Path {
    match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    }
}

/// Generate a unique hidden sibling temp path for `target`.
/// Pattern: .<basename>.<pid>.<nanos>.<seq>.tmp
///
/// pid + clock + process-wide sequence keeps concurrent writers (threads or
/// processes) apart; callers still open with create-new and retry on collision.
pub fn tmp_sibling_name(target: &Path) -> PathBuf {
    let pid = std::process::id();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let seq = COUNTER.fetch_add(1, Ordering::Relaxed);

    let base = target
        .file_name()
        .unwrap_or_else(|| OsStr::new("file"));
    let mut name = OsString::from(".");
    name.push(base);
    name.push(format!(".{pid}.{nanos}.{seq}{TMP_SUFFIX}"));
    sibling_dir(target).join(name)
}

/// True if `name` matches the temp pattern used for `target`'s base name.
pub fn is_tmp_sibling_of(target: &Path, name: &OsStr) -> bool {
    let Some(base) = target.file_name() else {
        return false;
    };
    let prefix = format!(".{}.", base.to_string_lossy());
    let name = name.to_string_lossy();
    name.starts_with(&prefix) && name.ends_with(TMP_SUFFIX)
}
