use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pokeworld")]
#[command(about = "PokeWorld database maintenance", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Merge Pokémon records sharing a name or slug into the oldest one
    CleanDuplicates,
    /// Report duplicate names and slugs without changing anything
    Audit,
    /// Create or update Pokémon from a CSV file
    Import {
        /// CSV with a header row: name,type1,type2,hp,attack,defense,sp_attack,sp_defense,speed,image_url
        path: PathBuf,
    },
    /// Delete all favorites and Pokémon
    ResetDb,
    /// Print configuration values
    PrintConfig,
}
