//! HTTP server for the RoverNet game backend.
//!
//! A thin transport over [`rovernet_store`] and [`rovernet_log`]: each
//! endpoint parses its request, hands typed input to the storage layer on
//! the blocking pool, and wraps the result in a `{success, message, data}`
//! envelope. Invalid input, absent records, corrupt records and storage
//! failures all map to distinguishable responses.

pub mod config;
pub mod error;
pub mod handler;
pub mod response;
pub mod router;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use response::ApiResponse;
pub use server::RoverServer;
pub use state::AppState;
