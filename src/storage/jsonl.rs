//! JSONL-based storage implementation.
//!
//! Each key maps to `<key>.jsonl` under the base directory, one JSON value per line.
//! Saves write a temporary file and rename it over the live one, so the live file is
//! always either the old or the new content. The previous file is copied to
//! `<key>.jsonl.bak` first.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use super::traits::{RecordStore, validate_key};
use crate::error::{Result, SyncError};

/// JSONL-based storage.
#[derive(Debug, Clone)]
pub struct JsonlStore {
    base_path: PathBuf,
}

impl JsonlStore {
    /// Create a new JsonlStore at the given path.
    pub fn new(base_path: impl AsRef<Path>) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    /// Directory holding the collection files.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Get the file path for a key.
    pub fn key_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.jsonl", key))
    }

    fn backup_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.jsonl.bak", key))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.jsonl.tmp", key))
    }
}

#[async_trait]
impl RecordStore for JsonlStore {
    async fn load(&self, key: &str) -> Result<Vec<Value>> {
        validate_key(key)?;
        let path = self.key_path(key);

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(SyncError::StorageRead(format!("Failed to read {}: {}", path.display(), e)));
            }
        };

        let mut values = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line).map_err(|e| {
                SyncError::StorageRead(format!("{}:{}: {}", path.display(), index + 1, e))
            })?;
            values.push(value);
        }

        debug!("Loaded {} values from {}", values.len(), path.display());
        Ok(values)
    }

    async fn save(&self, key: &str, values: &[Value]) -> Result<()> {
        validate_key(key).map_err(|e| SyncError::StorageWrite(e.to_string()))?;
        let path = self.key_path(key);
        let temp = self.temp_path(key);

        let mut content = String::new();
        for value in values {
            content.push_str(&serde_json::to_string(value)?);
            content.push('\n');
        }

        let write_err = |e: std::io::Error| SyncError::StorageWrite(format!("{}: {}", path.display(), e));

        tokio::fs::write(&temp, content).await.map_err(write_err)?;
        if tokio::fs::try_exists(&path).await.map_err(write_err)? {
            tokio::fs::copy(&path, self.backup_path(key)).await.map_err(write_err)?;
        }
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(write_err(e));
        }

        debug!("Saved {} values to {}", values.len(), path.display());
        Ok(())
    }
}
