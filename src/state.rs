use std::sync::Arc;
use crate::config::Config;
use crate::services::{HistoryStore, SharedAnalyzer, SharedStore, UserDirectory};

// Application state shared between handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub directory: UserDirectory,
    pub history: HistoryStore,
    pub analyzer: SharedAnalyzer,
}

impl AppState {
    pub fn new(config: Config, store: SharedStore, analyzer: SharedAnalyzer) -> Self {
        let directory = UserDirectory::new(
            store.clone(),
            config.directory.max_users,
            config.directory.bcrypt_cost,
        );
        Self {
            config: Arc::new(config),
            directory,
            history: HistoryStore::new(store),
            analyzer,
        }
    }
}
