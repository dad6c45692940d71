use std::sync::Arc;

use rovernet_log::AdminLog;
use rovernet_store::{Collection, FileDocumentStore, KeyValueStore};

use crate::config::ServerConfig;

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub players: Arc<dyn KeyValueStore>,
    pub companies: Arc<dyn KeyValueStore>,
    pub admin_log: Arc<AdminLog>,
}

impl AppState {
    pub fn new(
        players: Arc<dyn KeyValueStore>,
        companies: Arc<dyn KeyValueStore>,
        admin_log: Arc<AdminLog>,
    ) -> Self {
        Self {
            players,
            companies,
            admin_log,
        }
    }

    /// Filesystem-backed state rooted at `config.data_root`.
    pub fn from_config(config: &ServerConfig) -> Self {
        let layout = config.layout();
        Self::new(
            Arc::new(FileDocumentStore::in_layout(&layout, Collection::players())),
            Arc::new(FileDocumentStore::in_layout(&layout, Collection::companies())),
            Arc::new(AdminLog::in_layout(&layout, config.lock_policy())),
        )
    }
}
