use super::models::*;
use super::sqlite::Database;
use rusqlite::{params, OptionalExtension, Result, Row};
use tracing::debug;

pub(super) const POKEMON_COLUMNS: &str = "id, name, slug, type1, type2, hp, attack, defense, \
                                          sp_attack, sp_defense, speed, image_url";

pub(super) fn pokemon_from_row(row: &Row<'_>) -> Result<Pokemon> {
    Ok(Pokemon {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        type1: row.get(3)?,
        type2: row.get(4)?,
        hp: row.get(5)?,
        attack: row.get(6)?,
        defense: row.get(7)?,
        sp_attack: row.get(8)?,
        sp_defense: row.get(9)?,
        speed: row.get(10)?,
        image_url: row.get(11)?,
    })
}

fn favorite_from_row(row: &Row<'_>) -> Result<Favorite> {
    Ok(Favorite {
        id: row.get(0)?,
        user_id: row.get(1)?,
        pokemon_id: row.get(2)?,
        created_at: row.get(3)?,
    })
}

/// `?,?,?` with `count` placeholders.
pub(super) fn repeat_vars(count: usize) -> String {
    vec!["?"; count].join(",")
}

impl Database {
    // ── Pokémon ──────────────────────────────────────────────────

    /// Insert a row as-is. No uniqueness check is made; use
    /// [`crate::ingest::upsert_pokemon`] for checked writes.
    pub fn insert_pokemon(&self, pokemon: &NewPokemon) -> Result<i64> {
        self.connection().execute(
            "INSERT INTO pokemon (name, slug, type1, type2, hp, attack, defense, \
             sp_attack, sp_defense, speed, image_url) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                pokemon.name,
                pokemon.slug,
                pokemon.type1,
                pokemon.type2,
                pokemon.hp,
                pokemon.attack,
                pokemon.defense,
                pokemon.sp_attack,
                pokemon.sp_defense,
                pokemon.speed,
                pokemon.image_url,
            ],
        )?;
        let id = self.connection().last_insert_rowid();
        debug!("Inserted pokemon {} ({}) as ID {}", pokemon.name, pokemon.slug, id);
        Ok(id)
    }

    /// Overwrite every column except `id`.
    pub fn update_pokemon(&self, id: i64, pokemon: &NewPokemon) -> Result<usize> {
        self.connection().execute(
            "UPDATE pokemon SET name = ?1, slug = ?2, type1 = ?3, type2 = ?4, hp = ?5, \
             attack = ?6, defense = ?7, sp_attack = ?8, sp_defense = ?9, speed = ?10, \
             image_url = ?11 WHERE id = ?12",
            params![
                pokemon.name,
                pokemon.slug,
                pokemon.type1,
                pokemon.type2,
                pokemon.hp,
                pokemon.attack,
                pokemon.defense,
                pokemon.sp_attack,
                pokemon.sp_defense,
                pokemon.speed,
                pokemon.image_url,
                id,
            ],
        )
    }

    pub fn get_pokemon(&self, id: i64) -> Result<Option<Pokemon>> {
        self.connection()
            .query_row(
                &format!("SELECT {} FROM pokemon WHERE id = ?1", POKEMON_COLUMNS),
                params![id],
                pokemon_from_row,
            )
            .optional()
    }

    /// Lowest-ID record with the given slug.
    pub fn find_pokemon_by_slug(&self, slug: &str) -> Result<Option<Pokemon>> {
        self.connection()
            .query_row(
                &format!(
                    "SELECT {} FROM pokemon WHERE slug = ?1 ORDER BY id LIMIT 1",
                    POKEMON_COLUMNS
                ),
                params![slug],
                pokemon_from_row,
            )
            .optional()
    }

    /// Lowest-ID record with the given name.
    pub fn find_pokemon_by_name(&self, name: &str) -> Result<Option<Pokemon>> {
        self.connection()
            .query_row(
                &format!(
                    "SELECT {} FROM pokemon WHERE name = ?1 ORDER BY id LIMIT 1",
                    POKEMON_COLUMNS
                ),
                params![name],
                pokemon_from_row,
            )
            .optional()
    }

    pub fn list_pokemon(&self) -> Result<Vec<Pokemon>> {
        let mut stmt = self
            .connection()
            .prepare(&format!("SELECT {} FROM pokemon ORDER BY id", POKEMON_COLUMNS))?;
        let rows = stmt
            .query_map([], pokemon_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn count_pokemon(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM pokemon", [], |row| row.get(0))
    }

    pub fn delete_all_pokemon(&self) -> Result<usize> {
        let deleted = self.connection().execute("DELETE FROM pokemon", [])?;
        debug!("Deleted {} pokemon", deleted);
        Ok(deleted)
    }

    // ── Favorites ────────────────────────────────────────────────

    /// Returns `false` if the user already had this Pokémon favorited.
    pub fn add_favorite(&self, user_id: i64, pokemon_id: i64) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();
        let inserted = self.connection().execute(
            "INSERT OR IGNORE INTO favorite (user_id, pokemon_id, created_at) \
             VALUES (?1, ?2, ?3)",
            params![user_id, pokemon_id, now],
        )?;
        Ok(inserted > 0)
    }

    pub fn remove_favorite(&self, user_id: i64, pokemon_id: i64) -> Result<bool> {
        let removed = self.connection().execute(
            "DELETE FROM favorite WHERE user_id = ?1 AND pokemon_id = ?2",
            params![user_id, pokemon_id],
        )?;
        Ok(removed > 0)
    }

    pub fn favorites_for_user(&self, user_id: i64) -> Result<Vec<Favorite>> {
        let mut stmt = self.connection().prepare(
            "SELECT id, user_id, pokemon_id, created_at FROM favorite \
             WHERE user_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![user_id], favorite_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn list_favorites(&self) -> Result<Vec<Favorite>> {
        let mut stmt = self
            .connection()
            .prepare("SELECT id, user_id, pokemon_id, created_at FROM favorite ORDER BY id")?;
        let rows = stmt
            .query_map([], favorite_from_row)?
            .collect::<Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn count_favorites(&self) -> Result<i64> {
        self.connection()
            .query_row("SELECT COUNT(*) FROM favorite", [], |row| row.get(0))
    }

    pub fn delete_all_favorites(&self) -> Result<usize> {
        let deleted = self.connection().execute("DELETE FROM favorite", [])?;
        debug!("Deleted {} favorites", deleted);
        Ok(deleted)
    }
}
