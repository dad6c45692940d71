use crate::collection::Collection;
use crate::document::Document;
use crate::error::StoreResult;

/// Per-key JSON document storage for a single collection.
///
/// All implementations must satisfy these invariants:
/// - Keys are normalized with the collection's [`KeyKind`] before any
///   storage location is derived. Invalid keys are rejected, never altered.
/// - A key that was never saved loads as `Ok(None)`, not an error.
/// - A stored document that cannot be decoded is reported as corrupt; no
///   default is substituted.
/// - `save` fully replaces the prior document, and a concurrent `load`
///   sees either the old or the new document in full.
/// - Nothing is cached between calls.
///
/// [`KeyKind`]: crate::key::KeyKind
pub trait KeyValueStore: Send + Sync {
    /// The collection this store serves.
    fn collection(&self) -> &Collection;

    /// Load the document stored under `key`.
    ///
    /// Returns `Ok(None)` if no document has been saved for `key`.
    fn load(&self, key: &str) -> StoreResult<Option<Document>>;

    /// Replace the document stored under `key`. Returns the bytes written.
    fn save(&self, key: &str, document: &Document) -> StoreResult<u64>;

    /// Check whether a document has been saved under `key`.
    fn exists(&self, key: &str) -> StoreResult<bool>;
}
