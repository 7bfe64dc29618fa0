use super::models::*;
use super::queries::{pokemon_from_row, repeat_vars, POKEMON_COLUMNS};
use super::sqlite::Database;
use crate::dedup::DedupStore;
use crate::error::Error;
use rusqlite::params_from_iter;
use tracing::{debug, warn};

impl DedupStore for Database {
    fn duplicate_keys(&self, field: KeyField) -> Result<Vec<DuplicateKey>, Error> {
        let column = field.column();
        let mut stmt = self.connection().prepare(&format!(
            "SELECT {col}, COUNT(id) FROM pokemon \
             GROUP BY {col} HAVING COUNT(id) > 1 ORDER BY {col}",
            col = column
        ))?;
        let keys = stmt
            .query_map([], |row| {
                Ok(DuplicateKey {
                    field,
                    value: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        debug!("{} duplicate {} keys", keys.len(), field);
        Ok(keys)
    }

    fn records_with_key(&self, field: KeyField, key: &str) -> Result<Vec<Pokemon>, Error> {
        let mut stmt = self.connection().prepare(&format!(
            "SELECT {} FROM pokemon WHERE {} = ?1 ORDER BY id",
            POKEMON_COLUMNS,
            field.column()
        ))?;
        let records = stmt
            .query_map([key], pokemon_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    fn redirect_favorites(&self, from_ids: &[i64], to_id: i64) -> Result<RedirectOutcome, Error> {
        if from_ids.is_empty() {
            return Ok(RedirectOutcome::default());
        }
        let vars = repeat_vars(from_ids.len());

        // A link conflicts when its user already favorites the target, or
        // favorites another record of the group through an older link.
        let mut stmt = self.connection().prepare(&format!(
            "SELECT f.id, f.user_id, f.pokemon_id FROM favorite f \
             WHERE f.pokemon_id IN ({vars}) AND EXISTS ( \
                 SELECT 1 FROM favorite o \
                 WHERE o.user_id = f.user_id AND o.id <> f.id \
                   AND (o.pokemon_id = ? OR (o.pokemon_id IN ({vars}) AND o.id < f.id)) \
             ) ORDER BY f.id",
            vars = vars
        ))?;
        let query_params = from_ids
            .iter()
            .copied()
            .chain(std::iter::once(to_id))
            .chain(from_ids.iter().copied());
        let conflicts = stmt
            .query_map(params_from_iter(query_params), |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?, row.get::<_, i64>(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        for (favorite_id, user_id, pokemon_id) in &conflicts {
            warn!(
                "User {} already favorites Pokémon {}; dropping redundant favorite on {}",
                user_id, to_id, pokemon_id
            );
            self.connection()
                .execute("DELETE FROM favorite WHERE id = ?1", [favorite_id])?;
        }

        let moved = self.connection().execute(
            &format!(
                "UPDATE favorite SET pokemon_id = ? WHERE pokemon_id IN ({})",
                vars
            ),
            params_from_iter(std::iter::once(to_id).chain(from_ids.iter().copied())),
        )?;

        debug!(
            "Redirected {} favorites to {} ({} dropped)",
            moved,
            to_id,
            conflicts.len()
        );
        Ok(RedirectOutcome {
            moved,
            dropped: conflicts.len(),
        })
    }

    fn delete_records(&self, ids: &[i64]) -> Result<usize, Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let deleted = self.connection().execute(
            &format!("DELETE FROM pokemon WHERE id IN ({})", repeat_vars(ids.len())),
            params_from_iter(ids.iter()),
        )?;
        debug!("Deleted pokemon {:?}", ids);
        Ok(deleted)
    }

    fn count_records(&self) -> Result<i64, Error> {
        Ok(self.count_pokemon()?)
    }

    fn atomically<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce() -> Result<T, Error>,
    {
        self.transaction(f)
    }
}
