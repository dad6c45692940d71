//! Filesystem-backed document store: one JSON file per key.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::atomic;
use crate::collection::{Collection, StorageLayout};
use crate::dir::ensure_dir;
use crate::document::{self, Document};
use crate::error::{StoreError, StoreResult};
use crate::traits::KeyValueStore;

/// Stores each document at `<dir>/<prefix>_<key>.json`.
///
/// The directory is created lazily on the first save. Saves go through
/// [`atomic::replace`], so saves to the same key never interleave and saves
/// to different keys never block each other.
#[derive(Clone, Debug)]
pub struct FileDocumentStore {
    dir: PathBuf,
    collection: Collection,
}

impl FileDocumentStore {
    /// Create a store backed by `dir`. Nothing is touched on disk yet.
    pub fn new(dir: impl Into<PathBuf>, collection: Collection) -> Self {
        Self {
            dir: dir.into(),
            collection,
        }
    }

    /// Create a store for `collection` under the layout's data root.
    pub fn in_layout(layout: &StorageLayout, collection: Collection) -> Self {
        Self::new(layout.collection_dir(&collection), collection)
    }

    /// Backing directory of this collection.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Normalize `key` and derive its file path.
    pub fn path_for(&self, key: &str) -> StoreResult<PathBuf> {
        let safe = self.collection.key_kind.normalize(key)?;
        Ok(self.dir.join(self.collection.file_name(&safe)))
    }
}

impl KeyValueStore for FileDocumentStore {
    fn collection(&self) -> &Collection {
        &self.collection
    }

    fn load(&self, key: &str) -> StoreResult<Option<Document>> {
        let path = self.path_for(key)?;

        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(collection = %self.collection.name, key, "document absent");
                return Ok(None);
            }
            Err(source) => return Err(StoreError::ReadFailure { path, source }),
        };

        let document = document::decode(&path, &bytes)?;
        debug!(
            collection = %self.collection.name,
            key,
            bytes = bytes.len(),
            "loaded document"
        );
        Ok(Some(document))
    }

    fn save(&self, key: &str, document: &Document) -> StoreResult<u64> {
        let path = self.path_for(key)?;
        ensure_dir(&self.dir)?;

        let bytes = document::encode(document)?;
        let written = atomic::replace(&path, &bytes)?;

        debug!(
            collection = %self.collection.name,
            key,
            bytes = written,
            path = %path.display(),
            "saved document"
        );
        Ok(written)
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        let path = self.path_for(key)?;
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(source) => Err(StoreError::ReadFailure { path, source }),
        }
    }
}
