use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use rovernet_log::LockPolicy;
use rovernet_store::StorageLayout;
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Root of the `players/`, `companies/` and `logs/` directories.
    pub data_root: PathBuf,
    /// Retry budget for the admin log's cross-process lock.
    pub lock_attempts: u32,
    pub lock_backoff_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let policy = LockPolicy::default();
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            data_root: PathBuf::from("data"),
            lock_attempts: policy.attempts,
            lock_backoff_ms: policy.backoff.as_millis() as u64,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(source: &str) -> ServerResult<Self> {
        toml::from_str(source).map_err(|e| ServerError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> ServerResult<Self> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| ServerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }

    pub fn layout(&self) -> StorageLayout {
        StorageLayout::new(&self.data_root)
    }

    pub fn lock_policy(&self) -> LockPolicy {
        LockPolicy {
            attempts: self.lock_attempts,
            backoff: Duration::from_millis(self.lock_backoff_ms),
        }
    }
}
