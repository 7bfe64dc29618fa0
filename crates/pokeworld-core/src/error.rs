use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// The data store failed or could not be reached. Fatal for the current run.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A write would give a second record the name of an existing one.
    #[error("Pokémon '{name}' already exists with ID {existing_id}")]
    DuplicateName { name: String, existing_id: i64 },

    #[error("Invariant violated: {0}")]
    Invariant(String),
}
