use crate::error::Error;
use crate::storage::Database;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetSummary {
    pub favorites_deleted: usize,
    pub pokemon_deleted: usize,
}

/// Delete all favorites, then all Pokémon, in one transaction.
pub fn reset(db: &Database) -> Result<ResetSummary, Error> {
    let summary = db.transaction(|| {
        let favorites_deleted = db.delete_all_favorites()?;
        let pokemon_deleted = db.delete_all_pokemon()?;
        Ok(ResetSummary {
            favorites_deleted,
            pokemon_deleted,
        })
    })?;

    info!(
        "Reset removed {} favorites and {} pokemon",
        summary.favorites_deleted, summary.pokemon_deleted
    );
    Ok(summary)
}
