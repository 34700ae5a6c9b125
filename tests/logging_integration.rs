use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use atomic_file::platform::open_log_file_secure_append;
use atomic_file::{WriteOptions, write_bytes};
use tempfile::tempdir;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt as tsfmt, registry};

/// Appends written bytes into a shared in-memory buffer.
#[derive(Clone)]
struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn captured(buf: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8_lossy(&buf.lock().unwrap()[..]).to_string()
}

#[test]
fn write_path_emits_debug_events() {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let make_writer = {
        let buf = buf.clone();
        move || BufferWriter(buf.clone())
    };
    let layer = tsfmt::layer()
        .with_writer(make_writer)
        .with_ansi(false)
        .compact();
    let subscriber = registry().with(EnvFilter::new("debug")).with(layer);

    // Scoped so the global subscriber stays untouched for other tests.
    let dispatch = tracing::Dispatch::new(subscriber);
    let td = tempdir().unwrap();
    let target = td.path().join("logged.txt");
    tracing::dispatcher::with_default(&dispatch, || {
        write_bytes(&target, "payload", &WriteOptions::default()).unwrap();
    });

    let contents = captured(&buf);
    assert!(
        contents.contains("Replaced target atomically"),
        "contents={contents}"
    );
}

#[test]
fn failed_write_is_logged_with_phase() {
    let buf = Arc::new(Mutex::new(Vec::new()));
    let make_writer = {
        let buf = buf.clone();
        move || BufferWriter(buf.clone())
    };
    let layer = tsfmt::layer()
        .with_writer(make_writer)
        .with_ansi(false)
        .compact();
    let subscriber = registry().with(EnvFilter::new("debug")).with(layer);

    let dispatch = tracing::Dispatch::new(subscriber);
    let td = tempdir().unwrap();
    let target = td.path().join("absent").join("x.txt");
    tracing::dispatcher::with_default(&dispatch, || {
        assert!(write_bytes(&target, "payload", &WriteOptions::default()).is_err());
    });

    let contents = captured(&buf);
    assert!(contents.contains("Atomic write failed"), "contents={contents}");
    assert!(contents.contains("create"), "contents={contents}");
}

#[test]
fn file_logging_writes_to_custom_path() {
    let td = tempdir().expect("tempdir");
    let log_path: PathBuf = td.path().join("atomic_file_test.log");

    // The binary refuses file logging below a symlinked ancestor (macOS /var).
    if atomic_file::path_has_symlink_ancestor(&log_path).unwrap() {
        eprintln!(
            "Skipping file logging test: path has symlink ancestor: {}",
            log_path.display()
        );
        return;
    }

    let file = open_log_file_secure_append(&log_path).expect("open_log_file_secure_append");
    let (writer, guard): (tracing_appender::non_blocking::NonBlocking, WorkerGuard) =
        tracing_appender::non_blocking(file);
    let file_layer = tsfmt::layer()
        .with_writer(move || writer.clone())
        .with_target(false)
        .compact();
    let subscriber = registry().with(EnvFilter::new("info")).with(file_layer);
    let dispatch = tracing::Dispatch::new(subscriber);

    tracing::dispatcher::with_default(&dispatch, || {
        tracing::info!("file-logging-test: written");
    });

    // Flush the non-blocking worker
    drop(guard);

    let contents = std::fs::read_to_string(&log_path).expect("read log file");
    assert!(
        contents.contains("file-logging-test"),
        "log file did not contain expected text; contents={}",
        contents
    );
}

#[cfg(unix)]
#[test]
fn leaked_temp_is_warned_about_once() {
    use atomic_file::AtomicWriter;
    use std::io::Read;
    use std::os::unix::fs::PermissionsExt;

    // root bypasses directory permissions
    if unsafe { libc::geteuid() } == 0 {
        eprintln!("Skipping: running as root");
        return;
    }

    let buf = Arc::new(Mutex::new(Vec::new()));
    let make_writer = {
        let buf = buf.clone();
        move || BufferWriter(buf.clone())
    };
    let layer = tsfmt::layer()
        .with_writer(make_writer)
        .with_ansi(false)
        .compact();
    let subscriber = registry().with(EnvFilter::new("warn")).with(layer);
    let dispatch = tracing::Dispatch::new(subscriber);

    let td = tempdir().unwrap();
    let dir = td.path().join("locked");
    std::fs::create_dir(&dir).unwrap();
    let target = dir.join("t.txt");

    let lock_dir = dir.clone();
    let mut writer = AtomicWriter::new(WriteOptions::default()).with_copy_fn(
        move |_r: &mut dyn Read, _w: &mut dyn Write| {
            std::fs::set_permissions(&lock_dir, std::fs::Permissions::from_mode(0o555))?;
            Err(io::Error::other("copier gave up"))
        },
    );
    let outcome = tracing::dispatcher::with_default(&dispatch, || {
        writer.write(&target, &b"ignored"[..])
    });
    std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o755)).unwrap();
    if let Some(leaked) = outcome.temp_path.as_deref() {
        std::fs::remove_file(leaked).unwrap();
    }

    assert!(!outcome.temp_deleted);
    let contents = captured(&buf);
    assert_eq!(
        contents.matches("WARN").count(),
        1,
        "expected a single warning; contents={contents}"
    );
    assert!(contents.contains("manual cleanup"), "contents={contents}");
}
