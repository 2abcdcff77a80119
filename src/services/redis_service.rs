use async_trait::async_trait;
use redis::{Client, AsyncCommands};
use std::sync::Arc;
use super::store::KeyValueStore;
use crate::errors::{StorageError, StorageResult};

pub struct RedisService {
    client: Arc<Client>,
}

impl RedisService {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    async fn connection(&self) -> StorageResult<redis::aio::Connection> {
        self.client
            .get_async_connection()
            .await
            .map_err(StorageError::from_redis)
    }
}

#[async_trait]
impl KeyValueStore for RedisService {
    fn backend_tag(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let mut conn = self.connection().await?;
        conn.get(key).await.map_err(StorageError::from_redis)
    }

    async fn put(&self, key: &str, value: String) -> StorageResult<()> {
        let mut conn = self.connection().await?;
        conn.set(key, value).await.map_err(StorageError::from_redis)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let mut conn = self.connection().await?;
        conn.del(key).await.map_err(StorageError::from_redis)
    }
}
