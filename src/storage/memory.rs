//! In-process storage for dry runs and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::traits::RecordStore;
use crate::error::Result;

/// Map-backed store that lives as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a key with values.
    pub fn with_values(key: impl Into<String>, values: Vec<Value>) -> Self {
        let mut map = HashMap::new();
        map.insert(key.into(), values);
        Self {
            values: RwLock::new(map),
        }
    }

    /// Copy of everything stored under `key`, if it was ever written.
    pub async fn snapshot(&self, key: &str) -> Option<Vec<Value>> {
        self.values.read().await.get(key).cloned()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn load(&self, key: &str) -> Result<Vec<Value>> {
        Ok(self.values.read().await.get(key).cloned().unwrap_or_default())
    }

    async fn save(&self, key: &str, values: &[Value]) -> Result<()> {
        self.values.write().await.insert(key.to_string(), values.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_missing_key_is_empty() {
        let store = MemoryStore::new();
        assert!(store.load("plugins").await.unwrap().is_empty());
        assert!(store.snapshot("plugins").await.is_none());
    }

    #[tokio::test]
    async fn test_save_replaces_values() {
        let store = MemoryStore::with_values("plugins", vec![json!(1), json!(2)]);
        store.save("plugins", &[json!(3)]).await.unwrap();
        assert_eq!(store.load("plugins").await.unwrap(), vec![json!(3)]);
        assert_eq!(store.snapshot("plugins").await, Some(vec![json!(3)]));
    }
}
