use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use crate::errors::{StorageError, StorageResult};

/// Key-value repository the directory and history stores are written against.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    async fn put(&self, key: &str, value: String) -> StorageResult<()>;

    async fn delete(&self, key: &str) -> StorageResult<()>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> StorageResult<Option<T>> {
    match store.get(key).await? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StorageError::Corrupt {
                key: key.to_string(),
                source,
            }),
        None => Ok(None),
    }
}

pub async fn put_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> StorageResult<()> {
    let raw = serde_json::to_string(value)?;
    store.put(key, raw).await
}
