pub mod config;
pub mod dedup;
pub mod error;
pub mod ingest;
pub mod progress;
pub mod reset;
pub mod slug;
pub mod storage;

pub use crate::config::AppConfig;
pub use dedup::{audit, DedupStore, Deduplicator};
pub use error::Error;
pub use progress::{CleanupReporter, SilentReporter};
