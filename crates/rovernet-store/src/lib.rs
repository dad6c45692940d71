//! JSON document storage for the RoverNet game backend.
//!
//! Game state lives in small JSON documents, one file per record, grouped
//! into collections (players, companies). This crate owns everything that
//! touches those files.
//!
//! # Components
//!
//! - [`key`] -- validates caller-supplied keys into safe file-name tokens
//! - [`dir`] -- lazy, idempotent creation of backing directories
//! - [`atomic`] -- temp-file-and-rename replacement of whole files
//! - [`KeyValueStore`] -- the load/save/exists interface every backend implements
//! - [`FileDocumentStore`] -- the filesystem backend
//! - [`InMemoryDocumentStore`] -- `HashMap` backend for tests and embedding
//!
//! # Design Rules
//!
//! 1. A key is validated before any path is built; invalid keys are rejected,
//!    never rewritten.
//! 2. "Not saved yet" is `Ok(None)`. Corrupt data is an error, never a default.
//! 3. Saves replace the whole document atomically.
//! 4. No caching: every call is a fresh round trip to the backend.
//! 5. Errors are returned to the caller, never logged and swallowed.

pub mod atomic;
pub mod collection;
pub mod dir;
pub mod document;
pub mod error;
pub mod file;
pub mod key;
pub mod memory;
pub mod traits;

pub use collection::{Collection, StorageLayout};
pub use dir::ensure_dir;
pub use document::Document;
pub use error::{ErrorKind, StoreError, StoreResult};
pub use file::FileDocumentStore;
pub use key::{KeyKind, SafeKey};
pub use memory::InMemoryDocumentStore;
pub use traits::KeyValueStore;
