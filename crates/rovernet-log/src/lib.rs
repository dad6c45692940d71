//! Administrative action log for the RoverNet game backend.
//!
//! Every moderation action (ban, kick, grant, ...) is recorded as a
//! [`LogEntry`] in one shared JSON array file, `admin_logs.json`. Entries are
//! only ever appended; nothing in this crate removes or reorders them.
//!
//! # Modules
//!
//! - [`entry`] -- [`LogEntry`] and validation of incoming [`LogEntryRequest`]s
//! - [`lock`] -- the [`LogLock`] critical section ([`ProcessLock`], [`FileLock`])
//! - [`log`] -- [`AdminLog`], the read-modify-write append path
//! - [`error`] -- [`LogError`]

pub mod entry;
pub mod error;
pub mod lock;
pub mod log;

pub use entry::{LogEntry, LogEntryRequest};
pub use error::{LogError, LogResult};
pub use lock::{FileLock, LockPolicy, LogLock, ProcessLock};
pub use log::{AdminLog, AppendReceipt};
