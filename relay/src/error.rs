use std::path::PathBuf;

use axum::http::StatusCode;

/// Failure reading or writing the on-disk chat records.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a valid chat record: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode chat record: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Every failure a chat operation can report to its caller.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    /// A required field is missing or empty. The caller can fix the request.
    #[error("{0}")]
    Validation(String),
    /// The roster service could not be reached or answered with an error.
    #[error("roster service unavailable: {0}")]
    UpstreamUnavailable(String),
    /// The store could not be persisted. The outcome of the operation is
    /// unknown and the whole operation should be retried.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl ChatError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ChatError::Validation(msg.into())
    }

    /// Stable machine-readable category.
    pub fn code(&self) -> &'static str {
        match self {
            ChatError::Validation(_) => "validation_error",
            ChatError::UpstreamUnavailable(_) => "upstream_unavailable",
            ChatError::Persistence(_) => "persistence_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ChatError::Validation(_) => StatusCode::BAD_REQUEST,
            ChatError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            ChatError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
