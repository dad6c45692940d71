//! The shared administrative action log.

use std::fs;
use std::path::{Path, PathBuf};

use rovernet_store::{atomic, ensure_dir, StorageLayout};
use serde_json::Value;
use tracing::{debug, warn};

use crate::entry::{LogEntry, LogEntryRequest};
use crate::error::{LogError, LogResult};
use crate::lock::{FileLock, LockPolicy, LogLock};

/// Outcome of a successful append.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppendReceipt {
    /// Entries in the log after this append.
    pub total_entries: usize,
    /// Size of the rewritten log file.
    pub bytes_written: u64,
}

/// A single JSON array of [`LogEntry`] objects, rewritten on every append.
///
/// Each append reads the whole file, pushes one entry, and atomically
/// replaces the file, all inside `L`'s critical section. The cost is linear
/// in log size, which is fine for low-frequency admin actions; a
/// high-volume log would need true appends and rotation instead.
///
/// Unlike document loads, an unreadable or malformed log does not block
/// new entries: the append starts over from an empty sequence and a
/// warning is emitted. This keeps admin actions recordable even after the
/// file has been damaged.
#[derive(Debug)]
pub struct AdminLog<L = FileLock> {
    path: PathBuf,
    lock: L,
}

impl AdminLog<FileLock> {
    /// Open the log at `path`, guarded by a cross-process file lock.
    pub fn open(path: impl Into<PathBuf>, policy: LockPolicy) -> Self {
        let path = path.into();
        let lock = FileLock::for_log(&path, policy);
        Self { path, lock }
    }

    /// Open the log at its standard location under `layout`.
    pub fn in_layout(layout: &StorageLayout, policy: LockPolicy) -> Self {
        Self::open(layout.admin_log_path(), policy)
    }
}

impl<L: LogLock> AdminLog<L> {
    /// Open the log at `path` with a caller-supplied lock.
    pub fn with_lock(path: impl Into<PathBuf>, lock: L) -> Self {
        Self {
            path: path.into(),
            lock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn lock(&self) -> &L {
        &self.lock
    }

    /// Validate `request` and append it to the log.
    ///
    /// Invalid entries are rejected before the lock is taken, so they never
    /// touch the filesystem.
    pub fn append(&self, request: &LogEntryRequest) -> LogResult<AppendReceipt> {
        let entry = request.validate()?;
        let record =
            serde_json::to_value(&entry).map_err(|e| LogError::Serialization(e.to_string()))?;

        self.lock.exclusive(|| {
            if let Some(dir) = self.path.parent() {
                if !dir.as_os_str().is_empty() {
                    ensure_dir(dir)?;
                }
            }

            let mut records = self.read_records();
            records.push(record);

            let bytes = serde_json::to_vec_pretty(&records)
                .map_err(|e| LogError::Serialization(e.to_string()))?;
            let bytes_written = atomic::replace(&self.path, &bytes)?;

            debug!(
                path = %self.path.display(),
                action = %entry.action,
                total = records.len(),
                bytes = bytes_written,
                "appended admin log entry"
            );
            Ok(AppendReceipt {
                total_entries: records.len(),
                bytes_written,
            })
        })
    }

    /// All well-formed entries currently in the log, in append order.
    ///
    /// A missing or malformed log reads as empty. Array elements that are
    /// not entry objects are kept on disk but skipped here.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.read_records()
            .into_iter()
            .filter_map(|record| serde_json::from_value(record).ok())
            .collect()
    }

    /// Current on-disk sequence, or an empty one if the file is missing or
    /// does not hold a JSON array.
    fn read_records(&self) -> Vec<Value> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "admin log unreadable; starting a fresh sequence");
                return Vec::new();
            }
        };

        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Array(records)) => records,
            Ok(_) => {
                warn!(path = %self.path.display(), "admin log is not a JSON array; starting a fresh sequence");
                Vec::new()
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "admin log is malformed; starting a fresh sequence");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::ProcessLock;
    use rovernet_store::{ErrorKind, StoreError};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::Duration;

    fn entry(actor: i64, action: &str, timestamp: i64) -> LogEntryRequest {
        LogEntry::new(actor, action, timestamp).into()
    }

    fn temp_log() -> (tempfile::TempDir, AdminLog) {
        let dir = tempfile::tempdir().unwrap();
        let log = AdminLog::in_layout(&StorageLayout::new(dir.path()), LockPolicy::default());
        (dir, log)
    }

    /// Records how many callers are inside the critical section at once.
    #[derive(Default)]
    struct RecordingLock {
        inner: ProcessLock,
        inside: AtomicUsize,
        peak: AtomicUsize,
        acquisitions: AtomicUsize,
    }

    impl LogLock for RecordingLock {
        fn exclusive<T, F>(&self, critical: F) -> LogResult<T>
        where
            F: FnOnce() -> LogResult<T>,
        {
            self.inner.exclusive(|| {
                self.acquisitions.fetch_add(1, Ordering::SeqCst);
                let now = self.inside.fetch_add(1, Ordering::SeqCst) + 1;
                self.peak.fetch_max(now, Ordering::SeqCst);
                // Widen the window in which a lost update could occur.
                thread::sleep(Duration::from_millis(1));
                let result = critical();
                self.inside.fetch_sub(1, Ordering::SeqCst);
                result
            })
        }
    }

    #[test]
    fn appends_in_order() {
        let (dir, log) = temp_log();

        let first = log.append(&entry(7, "ban", 1000)).unwrap();
        assert_eq!(first.total_entries, 1);

        let second = log.append(&entry(8, "unban", 2000)).unwrap();
        assert_eq!(second.total_entries, 2);

        let path = dir.path().join("logs").join("admin_logs.json");
        assert_eq!(fs::metadata(&path).unwrap().len(), second.bytes_written);

        let on_disk: Value = serde_json::from_slice(&fs::read(&path).unwrap()).unwrap();
        assert_eq!(
            on_disk,
            json!([
                {"actorUserId": 7, "targetUserId": null, "action": "ban", "details": "", "timestamp": 1000},
                {"actorUserId": 8, "targetUserId": null, "action": "unban", "details": "", "timestamp": 2000}
            ])
        );
        assert_eq!(
            log.entries(),
            vec![LogEntry::new(7, "ban", 1000), LogEntry::new(8, "unban", 2000)]
        );
    }

    #[test]
    fn invalid_entry_touches_nothing() {
        let (dir, log) = temp_log();
        let request = LogEntryRequest {
            actor_user_id: Some(json!(7)),
            action: Some(json!("")),
            timestamp: Some(json!(1000)),
            ..Default::default()
        };

        let err = log.append(&request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert!(!dir.path().join("logs").exists());
    }

    #[test]
    fn missing_log_reads_empty() {
        let (_dir, log) = temp_log();
        assert!(log.entries().is_empty());
    }

    #[test]
    fn malformed_log_starts_fresh() {
        let (dir, log) = temp_log();
        fs::create_dir_all(dir.path().join("logs")).unwrap();
        fs::write(log.path(), b"[{\"actorUserId\": 1,").unwrap();

        assert!(log.entries().is_empty());
        let receipt = log.append(&entry(7, "ban", 1000)).unwrap();
        assert_eq!(receipt.total_entries, 1);
        assert_eq!(log.entries(), vec![LogEntry::new(7, "ban", 1000)]);
    }

    #[test]
    fn non_array_log_starts_fresh() {
        let (dir, log) = temp_log();
        fs::create_dir_all(dir.path().join("logs")).unwrap();
        fs::write(log.path(), b"{\"oops\": true}").unwrap();

        assert_eq!(log.append(&entry(7, "ban", 1000)).unwrap().total_entries, 1);
    }

    #[test]
    fn foreign_records_are_preserved() {
        let (dir, log) = temp_log();
        fs::create_dir_all(dir.path().join("logs")).unwrap();
        fs::write(log.path(), b"[{\"legacy\": true}]").unwrap();

        assert_eq!(log.append(&entry(7, "ban", 1000)).unwrap().total_entries, 2);
        assert_eq!(log.entries(), vec![LogEntry::new(7, "ban", 1000)]);

        let on_disk: Value = serde_json::from_slice(&fs::read(log.path()).unwrap()).unwrap();
        assert_eq!(on_disk[0], json!({"legacy": true}));
    }

    #[test]
    fn blocked_directory_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("logs"), b"").unwrap();
        let log = AdminLog::with_lock(
            dir.path().join("logs").join("admin_logs.json"),
            ProcessLock::new(),
        );

        let err = log.append(&entry(7, "ban", 1000)).unwrap_err();
        assert!(matches!(
            err,
            LogError::Storage(StoreError::DirectoryCreateFailure { .. })
        ));
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
    }

    #[test]
    fn concurrent_appends_lose_nothing() {
        let (_dir, log) = temp_log();
        let log = Arc::new(log);
        let writers = 16;
        let barrier = Arc::new(Barrier::new(writers));

        let handles: Vec<_> = (0..writers)
            .map(|i| {
                let log = Arc::clone(&log);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    log.append(&entry(i as i64 + 1, "ban", 1000 + i as i64))
                        .unwrap()
                })
            })
            .collect();

        let mut totals: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap().total_entries).collect();
        totals.sort_unstable();
        assert_eq!(totals, (1..=writers).collect::<Vec<_>>());

        let mut actors: Vec<i64> = log.entries().iter().map(|e| e.actor_user_id).collect();
        actors.sort_unstable();
        assert_eq!(actors, (1..=writers as i64).collect::<Vec<_>>());
    }

    #[test]
    fn separate_handles_share_the_file_lock() {
        let dir = tempfile::tempdir().unwrap();
        let layout = StorageLayout::new(dir.path());
        let per_handle = 8;

        thread::scope(|s| {
            for handle in 0..2i64 {
                let layout = &layout;
                s.spawn(move || {
                    // Each handle has its own mutex, so only the OS lock
                    // serializes them, as with two processes.
                    let log = AdminLog::in_layout(layout, LockPolicy::default());
                    for n in 0..per_handle {
                        log.append(&entry(handle * 100 + n + 1, "mute", n)).unwrap();
                    }
                });
            }
        });

        let log = AdminLog::in_layout(&layout, LockPolicy::default());
        assert_eq!(log.entries().len(), 2 * per_handle as usize);
    }

    #[test]
    fn critical_section_is_never_shared() {
        let dir = tempfile::tempdir().unwrap();
        let log = AdminLog::with_lock(dir.path().join("admin_logs.json"), RecordingLock::default());

        thread::scope(|s| {
            for i in 0..8i64 {
                let log = &log;
                s.spawn(move || log.append(&entry(i + 1, "warn", i)).unwrap());
            }
        });

        assert_eq!(log.lock().peak.load(Ordering::SeqCst), 1);
        assert_eq!(log.lock().acquisitions.load(Ordering::SeqCst), 8);
        assert_eq!(log.entries().len(), 8);
    }
}
