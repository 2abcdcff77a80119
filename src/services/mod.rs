mod store;
mod memory_store;
mod redis_service;
mod directory;
mod history;
mod analyzer;
mod mock_analyzer;
mod remote_analyzer;
pub mod crop;

pub use store::SharedStore;
pub use memory_store::MemoryStore;
pub use redis_service::RedisService;
pub use directory::UserDirectory;
pub use history::{HistoryStore, filter_newest_first, remove_by_ids};
pub use analyzer::{SharedAnalyzer, analyze_batch, build_analyzer};

#[cfg(test)]
pub(crate) use analyzer::testing;
