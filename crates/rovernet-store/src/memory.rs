//! In-memory document store for tests and embedding.
//!
//! [`InMemoryDocumentStore`] applies the same key rules and encoding as the
//! filesystem backend, so callers can swap one for the other without any
//! change in observable behavior apart from durability.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{PoisonError, RwLock};

use crate::collection::Collection;
use crate::document::{self, Document};
use crate::error::{StoreError, StoreResult};
use crate::key::SafeKey;
use crate::traits::KeyValueStore;

/// A `HashMap`-backed implementation of [`KeyValueStore`].
///
/// Documents are held in their encoded form so byte counts and decode
/// failures match the filesystem backend. Data is lost when the store is
/// dropped.
#[derive(Debug)]
pub struct InMemoryDocumentStore {
    collection: Collection,
    documents: RwLock<HashMap<SafeKey, Vec<u8>>>,
}

impl InMemoryDocumentStore {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            documents: RwLock::new(HashMap::new()),
        }
    }

    /// Number of documents currently stored.
    ///
    /// A writer that panicked cannot leave a half-inserted entry behind, so
    /// the count is read through a poisoned lock.
    pub fn len(&self) -> usize {
        self.documents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store raw bytes under `key`, bypassing encoding. Used to simulate
    /// damaged records.
    pub fn insert_raw(&self, key: &str, bytes: Vec<u8>) -> StoreResult<()> {
        let key = self.collection.key_kind.normalize(key)?;
        self.documents
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?
            .insert(key, bytes);
        Ok(())
    }

    fn virtual_path(&self, key: &SafeKey) -> PathBuf {
        PathBuf::from(&self.collection.name).join(self.collection.file_name(key))
    }
}

impl KeyValueStore for InMemoryDocumentStore {
    fn collection(&self) -> &Collection {
        &self.collection
    }

    fn load(&self, key: &str) -> StoreResult<Option<Document>> {
        let key = self.collection.key_kind.normalize(key)?;
        let map = self
            .documents
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;

        match map.get(&key) {
            Some(bytes) => document::decode(&self.virtual_path(&key), bytes).map(Some),
            None => Ok(None),
        }
    }

    fn save(&self, key: &str, document: &Document) -> StoreResult<u64> {
        let key = self.collection.key_kind.normalize(key)?;
        let bytes = document::encode(document)?;
        let written = bytes.len() as u64;

        self.documents
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?
            .insert(key, bytes);
        Ok(written)
    }

    fn exists(&self, key: &str) -> StoreResult<bool> {
        let key = self.collection.key_kind.normalize(key)?;
        let map = self
            .documents
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;
        Ok(map.contains_key(&key))
    }
}
