use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::router::build_router;
use crate::state::AppState;

/// RoverNet game backend server.
pub struct RoverServer {
    config: ServerConfig,
    state: AppState,
}

impl RoverServer {
    /// Server with filesystem-backed storage under `config.data_root`.
    pub fn new(config: ServerConfig) -> Self {
        let state = AppState::from_config(&config);
        Self { config, state }
    }

    /// Server with caller-supplied storage backends.
    pub fn with_state(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the router (useful for testing).
    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let app = build_router(self.state);
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!(
            "RoverNet server listening on {} (data root: {})",
            self.config.bind_addr,
            self.config.data_root.display()
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| ServerError::Internal(e.to_string()))
    }
}
