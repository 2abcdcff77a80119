use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use super::store::KeyValueStore;
use crate::errors::{StorageError, StorageResult};

/// In-process store. With a quota set, a write that would push the total
/// size of keys and values past it is refused and nothing is written.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

}

#[cfg(test)]
impl MemoryStore {
    pub async fn entry_count(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        self.entries.lock().await.contains_key(key)
    }
}

fn used_bytes(entries: &HashMap<String, String>) -> usize {
    entries.iter().map(|(k, v)| k.len() + v.len()).sum()
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: String) -> StorageResult<()> {
        let mut entries = self.entries.lock().await;
        if let Some(quota) = self.quota_bytes {
            let replaced = entries.get(key).map_or(0, |old| key.len() + old.len());
            let projected = used_bytes(&entries) - replaced + key.len() + value.len();
            if projected > quota {
                tracing::warn!("Write to {} refused: {} bytes exceeds quota of {}", key, projected, quota);
                return Err(StorageError::QuotaExceeded);
            }
        }
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
