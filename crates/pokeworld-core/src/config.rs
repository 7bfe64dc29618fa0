use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_DATABASE_PATH: &str = "pokeworld.db";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_path: String,
}

/// Load `Config.toml` from the working directory (optional), then apply
/// `POKEWORLD_*` environment overrides.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .set_default("database_path", DEFAULT_DATABASE_PATH)?
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix("POKEWORLD"))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Load configuration from an explicit file, without environment overrides.
pub fn load_configuration_from(path: &Path) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .set_default("database_path", DEFAULT_DATABASE_PATH)?
        .add_source(ConfigFile::from(path).required(false))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
