//! Plugin-specific storage helpers.
//!
//! `PluginStore` splits the raw values of one storage key into managed records and
//! opaque foreign values, and hands out transactions. A transaction holds the store's
//! lock from `begin` until it is committed or dropped, so two passes over the same store
//! never interleave.

use log::{debug, warn};
use serde_json::Value;
use tokio::sync::{Mutex, MutexGuard};

use super::traits::RecordStore;
use crate::domain::StoredRecord;
use crate::error::{Result, SyncError};

/// Default storage key for plugin records.
pub const PLUGINS_KEY: &str = "plugins";

/// Typed access to the plugin records under one key.
#[derive(Debug)]
pub struct PluginStore<S: RecordStore> {
    storage: S,
    key: String,
    lock: Mutex<()>,
}

impl<S: RecordStore> PluginStore<S> {
    /// Create a new PluginStore over `storage` using `key`.
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            lock: Mutex::new(()),
        }
    }

    /// The storage key in use.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Start a transaction, waiting for any other one to finish.
    pub async fn begin(&self) -> Transaction<'_, S> {
        let guard = self.lock.lock().await;
        Transaction {
            store: self,
            _guard: guard,
            recovered: false,
        }
    }

    /// List all stored records, failing on unreadable data.
    pub async fn list_all(&self) -> Result<Vec<StoredRecord>> {
        let values = self.storage.load(&self.key).await?;
        values
            .into_iter()
            .enumerate()
            .map(|(index, value)| self.decode(index, value))
            .collect()
    }

    fn decode(&self, index: usize, value: Value) -> Result<StoredRecord> {
        StoredRecord::from_value(value)
            .map_err(|e| SyncError::StorageRead(format!("Record #{} in '{}': {}", index, self.key, e)))
    }
}

/// Exclusive load/commit scope over a PluginStore.
///
/// Dropping a transaction without committing leaves storage untouched.
pub struct Transaction<'a, S: RecordStore> {
    store: &'a PluginStore<S>,
    _guard: MutexGuard<'a, ()>,
    recovered: bool,
}

impl<S: RecordStore> Transaction<'_, S> {
    /// Load the current records.
    ///
    /// A storage read failure is logged and yields an empty list. A managed record that
    /// no longer decodes is logged and skipped; foreign values are never decoded.
    pub async fn load(&mut self) -> Vec<StoredRecord> {
        let values = match self.store.storage.load(&self.store.key).await {
            Ok(values) => values,
            Err(e) => {
                warn!("Starting from an empty record set: {}", e);
                self.recovered = true;
                return Vec::new();
            }
        };

        let mut records = Vec::with_capacity(values.len());
        for (index, value) in values.into_iter().enumerate() {
            match self.store.decode(index, value) {
                Ok(record) => records.push(record),
                Err(e) => {
                    warn!("Dropping unreadable managed record: {}", e);
                    self.recovered = true;
                }
            }
        }
        debug!("Loaded {} plugin records from '{}'", records.len(), self.store.key);
        records
    }

    /// True if `load` fell back to an empty record set or skipped a record.
    pub fn recovered(&self) -> bool {
        self.recovered
    }

    /// Persist `records` and end the transaction.
    pub async fn commit(self, records: &[StoredRecord]) -> Result<()> {
        if self.recovered {
            warn!("Overwriting unreadable records under '{}'", self.store.key);
        }

        let values = records
            .iter()
            .map(StoredRecord::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| SyncError::StorageWrite(e.to_string()))?;

        self.store
            .storage
            .save(&self.store.key, &values)
            .await
            .map_err(|e| match e {
                SyncError::StorageWrite(msg) => SyncError::StorageWrite(msg),
                other => SyncError::StorageWrite(other.to_string()),
            })
    }
}
