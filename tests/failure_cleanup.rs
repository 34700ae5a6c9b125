use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use atomic_file::{AtomicWriteError, AtomicWriter, WriteOptions, write_file, write_file_outcome};
use tempfile::tempdir;

/// Yields some bytes, then fails.
struct FailingReader {
    remaining: usize,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::other("source went away"));
        }
        let n = buf.len().min(self.remaining);
        buf[..n].fill(b'z');
        self.remaining -= n;
        Ok(n)
    }
}

fn tmp_entries(dir: &Path) -> usize {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .count()
}

#[test]
fn failing_source_leaves_existing_target_untouched() {
    let td = tempdir().unwrap();
    let target = td.path().join("keep.txt");
    fs::write(&target, "X").unwrap();

    let err = write_file(
        &target,
        FailingReader { remaining: 100_000 },
        &WriteOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, AtomicWriteError::Write { .. }), "{err}");
    assert_eq!(err.phase(), "write");
    assert_eq!(fs::read_to_string(&target).unwrap(), "X");
    assert_eq!(tmp_entries(td.path()), 0, "temp file should be cleaned up");
}

#[test]
fn failing_source_does_not_create_missing_target() {
    let td = tempdir().unwrap();
    let target = td.path().join("never.txt");

    let outcome = write_file_outcome(
        &target,
        FailingReader { remaining: 10 },
        &WriteOptions::default(),
    );
    assert!(!outcome.is_success());
    assert!(outcome.temp_deleted);
    assert!(outcome.temp_path.is_none());
    assert!(!target.exists());
    assert_eq!(tmp_entries(td.path()), 0);
}

#[test]
fn missing_parent_directory_fails_before_any_write() {
    let td = tempdir().unwrap();
    let target = td.path().join("no").join("such").join("dir.txt");

    let err = write_file(&target, &b"data"[..], &WriteOptions::default()).unwrap_err();
    assert_eq!(err.phase(), "create");
    assert_eq!(err.io_error().kind(), io::ErrorKind::NotFound);
    assert!(err.temp_path().is_none());
}

#[test]
fn directory_target_is_not_replaced() {
    let td = tempdir().unwrap();
    let target = td.path().join("a_dir");
    fs::create_dir(&target).unwrap();
    fs::write(target.join("inside"), "still here").unwrap();

    let err = write_file(&target, &b"data"[..], &WriteOptions::default()).unwrap_err();
    assert_eq!(err.phase(), "replace");
    assert!(target.is_dir());
    assert_eq!(fs::read_to_string(target.join("inside")).unwrap(), "still here");
    assert_eq!(tmp_entries(td.path()), 0);
}

#[cfg(unix)]
#[test]
fn unwritable_directory_reports_create_failure() {
    use std::os::unix::fs::PermissionsExt;

    // root bypasses directory permissions
    if unsafe { libc::geteuid() } == 0 {
        eprintln!("Skipping: running as root");
        return;
    }

    let td = tempdir().unwrap();
    let dir = td.path().join("ro");
    fs::create_dir(&dir).unwrap();
    let target = dir.join("t.txt");
    fs::write(&target, "X").unwrap();
    fs::set_permissions(&dir, fs::Permissions::from_mode(0o555)).unwrap();

    let res = write_file(&target, &b"new"[..], &WriteOptions::default());

    fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();
    let err = res.unwrap_err();
    assert!(matches!(err, AtomicWriteError::TempFileCreate { .. }), "{err}");
    assert_eq!(err.io_error().kind(), io::ErrorKind::PermissionDenied);
    assert_eq!(fs::read_to_string(&target).unwrap(), "X");
}

#[cfg(unix)]
#[test]
fn symlink_loop_target_fails_in_stat_and_cleans_up() {
    let td = tempdir().unwrap();
    let target = td.path().join("loop");
    std::os::unix::fs::symlink(&target, &target).unwrap();

    let outcome = write_file_outcome(&target, &b"data"[..], &WriteOptions::default());
    assert!(outcome.temp_deleted);
    let err = outcome.error.expect("stat of a symlink loop must fail");
    assert_eq!(err.phase(), "stat");
    assert!(err.temp_path().is_some(), "{err}");
    assert!(err.to_string().contains("loop"), "{err}");
    assert!(
        fs::symlink_metadata(&target).unwrap().file_type().is_symlink(),
        "target link must be left as it was"
    );
    assert_eq!(tmp_entries(td.path()), 0);
}

#[cfg(unix)]
#[test]
fn failed_cleanup_is_reported_not_raised() {
    use std::os::unix::fs::PermissionsExt;

    // root bypasses directory permissions
    if unsafe { libc::geteuid() } == 0 {
        eprintln!("Skipping: running as root");
        return;
    }

    let td = tempdir().unwrap();
    let dir = td.path().join("locked");
    fs::create_dir(&dir).unwrap();
    let target = dir.join("t.txt");
    fs::write(&target, "X").unwrap();

    let lock_dir = dir.clone();
    let mut writer = AtomicWriter::new(WriteOptions::default()).with_copy_fn(
        move |_r: &mut dyn Read, w: &mut dyn Write| {
            w.write_all(b"partial")?;
            fs::set_permissions(&lock_dir, fs::Permissions::from_mode(0o555))?;
            Err(io::Error::other("copier gave up"))
        },
    );
    let outcome = writer.write(&target, &b"ignored"[..]);

    fs::set_permissions(&dir, fs::Permissions::from_mode(0o755)).unwrap();

    assert!(!outcome.temp_deleted);
    let leaked = outcome.temp_path.clone().expect("leaked temp path is reported");
    assert!(leaked.exists(), "{}", leaked.display());
    assert_eq!(leaked.parent(), Some(dir.as_path()));
    let err = outcome.error.expect("primary error is kept");
    assert!(matches!(err, AtomicWriteError::Write { .. }), "{err}");
    assert_eq!(err.io_error().to_string(), "copier gave up");
    assert_eq!(fs::read_to_string(&target).unwrap(), "X");

    fs::remove_file(&leaked).unwrap();
}
