//! Storage trait definitions.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, SyncError};

/// Durable mapping from a string key to a list of JSON values.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Load every value stored under `key`. A missing key is an empty list.
    async fn load(&self, key: &str) -> Result<Vec<Value>>;

    /// Replace everything stored under `key`.
    async fn save(&self, key: &str, values: &[Value]) -> Result<()>;
}

/// Reject keys that could escape a storage directory.
pub fn validate_key(key: &str) -> Result<()> {
    let valid = !key.is_empty()
        && key != "."
        && key != ".."
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(SyncError::StorageRead(format!("Invalid storage key: {:?}", key)))
    }
}
