use crate::dedup::DedupStore;
use crate::error::Error;
use crate::slug::slugify;
use crate::storage::models::{KeyField, NewPokemon};
use crate::storage::Database;
use serde::Deserialize;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

/// One CSV row: `name,type1,type2,hp,attack,defense,sp_attack,sp_defense,speed,image_url`.
#[derive(Debug, Clone, Deserialize)]
pub struct PokemonInput {
    pub name: String,
    pub type1: String,
    pub type2: Option<String>,
    pub hp: i64,
    pub attack: i64,
    pub defense: i64,
    pub sp_attack: i64,
    pub sp_defense: i64,
    pub speed: i64,
    pub image_url: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl NewPokemon {
    /// Build a row from input, deriving the slug from the name.
    pub fn from_input(input: &PokemonInput) -> Self {
        let name = input.name.trim().to_string();
        NewPokemon {
            slug: slugify(&name),
            name,
            type1: input.type1.trim().to_string(),
            type2: non_blank(&input.type2),
            hp: input.hp,
            attack: input.attack,
            defense: input.defense,
            sp_attack: input.sp_attack,
            sp_defense: input.sp_defense,
            speed: input.speed,
            image_url: non_blank(&input.image_url),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created(i64),
    Updated(i64),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub rejected: usize,
}

/// Create or update a Pokémon keyed by slug.
///
/// An existing record with the same slug is updated in place. The write is
/// rejected when any other record already holds the name, so ingestion never
/// introduces a name or slug collision.
pub fn upsert_pokemon(db: &Database, input: &PokemonInput) -> Result<UpsertOutcome, Error> {
    let record = NewPokemon::from_input(input);

    db.transaction(|| {
        let target = db.find_pokemon_by_slug(&record.slug)?.map(|p| p.id);

        let name_holder = db
            .records_with_key(KeyField::Name, &record.name)?
            .into_iter()
            .map(|p| p.id)
            .find(|id| Some(*id) != target);
        if let Some(existing_id) = name_holder {
            return Err(Error::DuplicateName {
                name: record.name.clone(),
                existing_id,
            });
        }

        match target {
            Some(id) => {
                db.update_pokemon(id, &record)?;
                debug!("Updated {} (ID {})", record.name, id);
                Ok(UpsertOutcome::Updated(id))
            }
            None => {
                let id = db.insert_pokemon(&record)?;
                Ok(UpsertOutcome::Created(id))
            }
        }
    })
}

/// Upsert every row of a CSV document. Rows rejected for name collisions are
/// skipped; malformed rows abort the import.
pub fn import_reader<R: io::Read>(db: &Database, reader: R) -> Result<ImportSummary, Error> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut summary = ImportSummary::default();

    for row in csv_reader.deserialize::<PokemonInput>() {
        let input = row?;
        match upsert_pokemon(db, &input) {
            Ok(UpsertOutcome::Created(_)) => summary.created += 1,
            Ok(UpsertOutcome::Updated(_)) => summary.updated += 1,
            Err(err @ Error::DuplicateName { .. }) => {
                warn!("Skipping row: {}", err);
                summary.rejected += 1;
            }
            Err(err) => return Err(err),
        }
    }

    info!(
        "Import finished: {} created, {} updated, {} rejected",
        summary.created, summary.updated, summary.rejected
    );
    Ok(summary)
}

pub fn import_csv(db: &Database, path: &Path) -> Result<ImportSummary, Error> {
    let file = std::fs::File::open(path)?;
    import_reader(db, file)
}
