//! Error types for plugsync
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur during a sync pass
#[derive(Debug, Error)]
pub enum SyncError {
    /// Bridge unreachable or answered with a non-success status
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Catalog payload did not match the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// Stored records could not be read or parsed
    #[error("Storage read error: {0}")]
    StorageRead(String),

    /// Merged records could not be persisted
    #[error("Storage write error: {0}")]
    StorageWrite(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for plugsync operations
pub type Result<T> = std::result::Result<T, SyncError>;
