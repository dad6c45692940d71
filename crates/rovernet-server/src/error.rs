use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rovernet_log::LogError;
use rovernet_store::{ErrorKind, StoreError};
use thiserror::Error;

use crate::response::ApiResponse;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("admin log error: {0}")]
    Log(#[from] LogError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Storage taxonomy of this error, if it came from the storage layer.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::BadRequest(_) => Some(ErrorKind::InvalidInput),
            Self::Store(e) => Some(e.kind()),
            Self::Log(e) => Some(e.kind()),
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            Some(ErrorKind::InvalidInput) => StatusCode::BAD_REQUEST,
            Some(ErrorKind::Corrupt) => StatusCode::UNPROCESSABLE_ENTITY,
            Some(ErrorKind::StorageUnavailable) | None => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to clients. Filesystem paths stay in the server log.
    fn public_message(&self) -> String {
        match self {
            Self::BadRequest(message) => message.clone(),
            Self::Store(StoreError::InvalidKey { reason, .. }) => format!("Invalid key: {reason}"),
            Self::Log(LogError::InvalidEntry { field, reason }) => {
                format!("Invalid or missing {field}: {reason}")
            }
            Self::Store(StoreError::Corrupt { .. }) => "Failed to decode stored data".into(),
            Self::Store(_) | Self::Log(_) => "Storage unavailable".into(),
            Self::Config(_) | Self::Io(_) | Self::Internal(_) => "Internal server error".into(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() || status == StatusCode::UNPROCESSABLE_ENTITY {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(ApiResponse::failure(self.public_message()))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
