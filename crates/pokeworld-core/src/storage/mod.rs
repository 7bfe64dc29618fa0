mod dedup_store;
pub mod models;
mod queries;
mod sqlite;

pub use sqlite::Database;
