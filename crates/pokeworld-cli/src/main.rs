mod commands;
mod logging;
mod progress;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use colored::*;
use commands::{Cli, Commands};
use dotenv::dotenv;
use pokeworld_core::dedup::report::Verification;
use pokeworld_core::storage::models::DuplicateKey;
use pokeworld_core::storage::Database;
use pokeworld_core::{AppConfig, Deduplicator};
use progress::CliReporter;
use std::path::Path;
use tracing::{error, info};

fn main() -> ExitCode {
    dotenv().ok();

    let _guard = logging::init_logger();

    let config = match pokeworld_core::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            return ExitCode::FAILURE;
        }
    };

    let args = Cli::parse();

    let result = match args.command {
        Some(Commands::CleanDuplicates) => run_clean_duplicates(&config),
        Some(Commands::Audit) => run_audit(&config),
        Some(Commands::Import { path }) => run_import(&config, &path),
        Some(Commands::ResetDb) => {
            match prompt_confirm(
                "Are you SURE you want to delete ALL Pokémon and favorites?",
                Some(false),
            ) {
                Ok(true) => run_reset(&config),
                _ => return ExitCode::SUCCESS,
            }
        }
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:?}", config);
            Ok(())
        }
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    // `_guard` has to drop before the process ends or the file log loses
    // the last records, so never `process::exit` here.
    exit_code(result)
}

fn exit_code(result: Result<(), Box<dyn std::error::Error>>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn open_database(config: &AppConfig) -> Result<Database, pokeworld_core::Error> {
    info!("Using database {}", config.database_path);
    Ok(Database::open(&config.database_path)?)
}

fn run_clean_duplicates(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_database(config)?;
    let reporter = CliReporter::new();
    Deduplicator::new(&db).run(&reporter)?;
    Ok(())
}

fn print_keys(label: &str, keys: &[DuplicateKey]) {
    if keys.is_empty() {
        return;
    }
    println!("Duplicate {}:", label);
    for key in keys {
        println!("  - {}: {} entries", key.value, key.count);
    }
}

fn run_audit(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_database(config)?;
    match pokeworld_core::audit(&db)? {
        Verification::Clean => {
            println!("{}", "✓ No duplicates in the database".green());
        }
        Verification::DuplicatesRemain { names, slugs } => {
            print_keys("names", &names);
            print_keys("slugs", &slugs);
            println!(
                "{}",
                "⚠ Duplicates found, run `pokeworld clean-duplicates` to merge them".yellow()
            );
        }
    }
    Ok(())
}

fn run_import(config: &AppConfig, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_database(config)?;
    let summary = pokeworld_core::ingest::import_csv(&db, path)?;
    println!(
        "{} created, {} updated, {} rejected",
        format!("{}", summary.created).green(),
        format!("{}", summary.updated).cyan(),
        format!("{}", summary.rejected).red(),
    );
    Ok(())
}

fn run_reset(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_database(config)?;
    println!("Starting database reset...");
    let summary = pokeworld_core::reset::reset(&db)?;
    println!("Deleted {} favorites", summary.favorites_deleted);
    println!("Deleted {} Pokémon", summary.pokemon_deleted);
    println!("{}", "Database reset complete!".green());
    println!("Now run: pokeworld import <csv>");
    Ok(())
}

fn prompt_confirm(prompt: &str, default: Option<bool>) -> io::Result<bool> {
    let mut input = String::new();

    loop {
        input.clear();

        match default {
            Some(true) => print!("{} (Y/n): ", prompt),
            Some(false) | None => print!("{} (y/N): ", prompt),
        }
        io::stdout().flush()?;

        io::stdin().read_line(&mut input)?;

        match input.trim().to_uppercase().as_str() {
            "Y" => return Ok(true),
            "N" => return Ok(false),
            "" => match default {
                Some(default) => return Ok(default),
                None => continue,
            },
            _ => continue,
        }
    }
}
