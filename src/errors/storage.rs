use thiserror::Error;
use redis::RedisError;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage Full! Please delete some old records to save new ones.")]
    QuotaExceeded,

    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Corrupt entry under {key}: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StorageError {
    // Redis reports maxmemory rejections with the OOM error code.
    pub fn from_redis(err: RedisError) -> Self {
        if err.code() == Some("OOM") {
            StorageError::QuotaExceeded
        } else {
            StorageError::Redis(err)
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
