//! Mutual exclusion for the admin log's read-modify-write cycle.
//!
//! [`AdminLog`](crate::AdminLog) is generic over [`LogLock`] so tests can
//! observe or perturb the critical section. Two implementations ship:
//!
//! - [`ProcessLock`] -- a mutex; correct when one process owns the log
//! - [`FileLock`] -- a mutex plus an advisory OS lock on a sidecar file;
//!   correct when several processes share the data directory

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use fs2::FileExt;
use rovernet_store::ensure_dir;
use tracing::debug;

use crate::error::{LogError, LogResult};

/// A critical section guarding the log resource.
pub trait LogLock: Send + Sync {
    /// Run `critical` while holding exclusive access to the log.
    fn exclusive<T, F>(&self, critical: F) -> LogResult<T>
    where
        F: FnOnce() -> LogResult<T>;
}

/// In-process mutual exclusion.
#[derive(Debug, Default)]
pub struct ProcessLock {
    inner: Mutex<()>,
}

impl ProcessLock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LogLock for ProcessLock {
    fn exclusive<T, F>(&self, critical: F) -> LogResult<T>
    where
        F: FnOnce() -> LogResult<T>,
    {
        // The mutex guards no data, so a poisoned lock is still usable.
        let _guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        critical()
    }
}

/// How long [`FileLock`] keeps retrying a contended lock before giving up.
///
/// The lock is always tried at least once, even with `attempts: 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for LockPolicy {
    fn default() -> Self {
        Self {
            attempts: 2000,
            backoff: Duration::from_millis(5),
        }
    }
}

/// Cross-process mutual exclusion via an advisory lock on `<log>.lock`.
///
/// Threads of one process first serialize on a mutex, then the winner takes
/// the OS lock with bounded non-blocking retries. The OS lock is released
/// when the lock file handle is dropped.
#[derive(Debug)]
pub struct FileLock {
    path: PathBuf,
    policy: LockPolicy,
    local: Mutex<()>,
}

impl FileLock {
    pub fn new(path: impl Into<PathBuf>, policy: LockPolicy) -> Self {
        Self {
            path: path.into(),
            policy,
            local: Mutex::new(()),
        }
    }

    /// Lock file guarding the log at `log_path`.
    pub fn for_log(log_path: &Path, policy: LockPolicy) -> Self {
        let mut name = log_path.as_os_str().to_owned();
        name.push(".lock");
        Self::new(PathBuf::from(name), policy)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn policy(&self) -> LockPolicy {
        self.policy
    }

    fn acquire(&self) -> LogResult<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_dir(parent)?;
            }
        }

        let lock_err = |source| LogError::Lock {
            path: self.path.clone(),
            source,
        };
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.path)
            .map_err(lock_err)?;

        let attempts = self.policy.attempts.max(1);
        let contended = fs2::lock_contended_error().kind();
        for attempt in 0..attempts {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    if attempt > 0 {
                        debug!(path = %self.path.display(), attempt, "acquired contended lock");
                    }
                    return Ok(file);
                }
                Err(e) if e.kind() == contended => thread::sleep(self.policy.backoff),
                Err(e) => return Err(lock_err(e)),
            }
        }

        Err(LogError::LockTimeout {
            path: self.path.clone(),
            attempts,
        })
    }
}

impl LogLock for FileLock {
    fn exclusive<T, F>(&self, critical: F) -> LogResult<T>
    where
        F: FnOnce() -> LogResult<T>,
    {
        let _guard = self.local.lock().unwrap_or_else(PoisonError::into_inner);
        let _file = self.acquire()?;
        critical()
    }
}
