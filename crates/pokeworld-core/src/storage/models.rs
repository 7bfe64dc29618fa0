use std::fmt;

/// A stored Pokémon row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pokemon {
    pub id: i64,
    pub name: String,
    pub slug: String,
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

/// Column values for a Pokémon row that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPokemon {
    pub name: String,
    pub slug: String,
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

/// A user's bookmark of a Pokémon. `(user_id, pokemon_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub pokemon_id: i64,
    pub created_at: String,
}

/// The column a duplicate scan groups by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyField {
    Name,
    Slug,
}

impl KeyField {
    pub fn column(&self) -> &'static str {
        match self {
            KeyField::Name => "name",
            KeyField::Slug => "slug",
        }
    }
}

impl fmt::Display for KeyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A key value shared by more than one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKey {
    pub field: KeyField,
    pub value: String,
    pub count: i64,
}

/// Result of moving favorites off a set of records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedirectOutcome {
    pub moved: usize,
    /// Links removed because the user already had the target favorited.
    pub dropped: usize,
}
