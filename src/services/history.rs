use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use crate::errors::StorageResult;
use crate::models::{AnalysisRecord, StatusFilter};
use super::store::{get_json, put_json, SharedStore};

const HISTORY_PREFIX: &str = "history:";

pub fn partition_key(username: &str) -> String {
    format!("{}{}", HISTORY_PREFIX, username)
}

/// Result of a locked history mutation. `records` is the partition after
/// the change; `saved` reports whether it reached the store.
pub struct HistoryUpdate<T> {
    pub records: Vec<AnalysisRecord>,
    pub outcome: T,
    pub saved: StorageResult<()>,
}

/// Per-user analysis history, one entry per username.
#[derive(Clone)]
pub struct HistoryStore {
    store: SharedStore,
    partitions: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl HistoryStore {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            partitions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    async fn partition_lock(&self, username: &str) -> Arc<Mutex<()>> {
        let mut partitions = self.partitions.lock().await;
        partitions.entry(username.to_string()).or_default().clone()
    }

    pub async fn load(&self, username: &str) -> StorageResult<Vec<AnalysisRecord>> {
        let records: Vec<AnalysisRecord> = get_json(self.store.as_ref(), &partition_key(username))
            .await?
            .unwrap_or_default();
        tracing::debug!("Loaded {} history records for {}", records.len(), username);
        Ok(records)
    }

    /// Writes the whole partition. An empty list removes the entry.
    pub async fn save(&self, username: &str, records: &[AnalysisRecord]) -> StorageResult<()> {
        let key = partition_key(username);
        if records.is_empty() {
            tracing::debug!("History for {} is empty, removing {}", username, key);
            return self.store.delete(&key).await;
        }
        put_json(self.store.as_ref(), &key, records).await?;
        tracing::debug!("Saved {} history records for {}", records.len(), username);
        Ok(())
    }

    /// Reloads the stored partition, applies `apply` and writes it back while
    /// holding the user's lock, so concurrent sessions of one user never
    /// overwrite each other. A failed load changes nothing; a failed save
    /// still hands back the mutated records.
    pub async fn modify<T, F>(&self, username: &str, apply: F) -> StorageResult<HistoryUpdate<T>>
    where
        F: FnOnce(&mut Vec<AnalysisRecord>) -> T,
    {
        let lock = self.partition_lock(username).await;
        let _guard = lock.lock().await;

        let mut records = self.load(username).await?;
        let outcome = apply(&mut records);
        let saved = self.save(username, &records).await;

        Ok(HistoryUpdate { records, outcome, saved })
    }
}

/// Removes the records whose id is listed; returns how many went.
pub fn remove_by_ids(records: &mut Vec<AnalysisRecord>, ids: &[String]) -> usize {
    let before = records.len();
    records.retain(|record| !ids.contains(&record.id));
    before - records.len()
}

/// Records matching the filter, newest first.
pub fn filter_newest_first(records: &[AnalysisRecord], filter: StatusFilter) -> Vec<&AnalysisRecord> {
    records
        .iter()
        .rev()
        .filter(|record| filter.matches(record.status))
        .collect()
}
