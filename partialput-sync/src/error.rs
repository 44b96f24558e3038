//! Error types for the sync layer.

use serde_json::Value;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur in sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The request never produced a response (connection, DNS, TLS...).
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("server responded with status {status}")]
    Http { status: u16, body: Value },

    /// The response body could not be turned into attributes.
    #[error("invalid response: {0}")]
    Parse(#[from] partialput_types::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The transport dropped the request before answering.
    #[error("channel closed")]
    ChannelClosed,
}

impl SyncError {
    /// HTTP status for `Http` errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
