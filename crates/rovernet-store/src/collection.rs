//! Named document collections and the on-disk layout they live in.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::key::{KeyKind, SafeKey};

/// A named partition of documents sharing a directory and file-name scheme.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    /// Directory name under the data root, e.g. `players`.
    pub name: String,
    /// File name prefix, e.g. `player` for `player_42.json`.
    pub prefix: String,
    /// How keys in this collection are validated.
    pub key_kind: KeyKind,
}

impl Collection {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>, key_kind: KeyKind) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            key_kind,
        }
    }

    /// Per-player records keyed by positive user id.
    pub fn players() -> Self {
        Self::new("players", "player", KeyKind::PositiveInteger)
    }

    /// Per-company records keyed by company id.
    pub fn companies() -> Self {
        Self::new("companies", "company", KeyKind::Text)
    }

    /// `<prefix>_<key>.json`
    pub fn file_name(&self, key: &SafeKey) -> String {
        format!("{}_{}.json", self.prefix, key)
    }
}

/// Directory layout rooted at a single data directory.
///
/// ```text
/// <data_root>/players/player_<id>.json
/// <data_root>/companies/company_<id>.json
/// <data_root>/logs/admin_logs.json
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLayout {
    pub data_root: PathBuf,
}

impl StorageLayout {
    /// File name of the shared administrative log.
    pub const ADMIN_LOG_FILE: &'static str = "admin_logs.json";

    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }

    pub fn collection_dir(&self, collection: &Collection) -> PathBuf {
        self.data_root.join(&collection.name)
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.data_root.join("logs")
    }

    pub fn admin_log_path(&self) -> PathBuf {
        self.logs_dir().join(Self::ADMIN_LOG_FILE)
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self::new("data")
    }
}
