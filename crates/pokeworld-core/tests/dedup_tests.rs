use pokeworld_core::dedup::report::{GroupReport, PassReport, Verification};
use pokeworld_core::storage::models::*;
use pokeworld_core::storage::Database;
use pokeworld_core::{audit, CleanupReporter, DedupStore, Deduplicator, Error, SilentReporter};
use std::cell::Cell;
use std::sync::Mutex;

fn make_pokemon(name: &str, slug: &str) -> NewPokemon {
    NewPokemon {
        name: name.to_string(),
        slug: slug.to_string(),
        type1: "grass".to_string(),
        type2: Some("poison".to_string()),
        hp: 45,
        attack: 49,
        defense: 49,
        sp_attack: 65,
        sp_defense: 65,
        speed: 45,
        image_url: None,
    }
}

fn names(db: &Database) -> Vec<(i64, String)> {
    db.list_pokemon()
        .unwrap()
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect()
}

#[test]
fn test_survivor_is_lowest_id_in_each_name_group() {
    let db = Database::open_in_memory().unwrap();
    let ivysaur_1 = db.insert_pokemon(&make_pokemon("Ivysaur", "ivysaur")).unwrap();
    let oddish = db.insert_pokemon(&make_pokemon("Oddish", "oddish")).unwrap();
    db.insert_pokemon(&make_pokemon("Ivysaur", "ivysaur")).unwrap();
    db.insert_pokemon(&make_pokemon("Ivysaur", "ivysaur")).unwrap();
    db.insert_pokemon(&make_pokemon("Oddish", "oddish")).unwrap();

    let report = Deduplicator::new(&db).run(&SilentReporter).unwrap();

    assert_eq!(
        names(&db),
        vec![(ivysaur_1, "Ivysaur".to_string()), (oddish, "Oddish".to_string())]
    );
    assert_eq!(report.name_pass.groups.len(), 2);
    assert_eq!(report.name_pass.deleted(), 3);
    // Name pass already removed the slug collisions.
    assert!(report.slug_pass.groups.is_empty());
    assert_eq!(report.total_deleted(), 3);
}

#[test]
fn test_favorites_follow_the_survivor() {
    let db = Database::open_in_memory().unwrap();
    let survivor = db.insert_pokemon(&make_pokemon("Gloom", "gloom")).unwrap();
    let dup_a = db.insert_pokemon(&make_pokemon("Gloom", "gloom")).unwrap();
    let dup_b = db.insert_pokemon(&make_pokemon("Gloom", "gloom")).unwrap();

    db.add_favorite(1, dup_a).unwrap();
    db.add_favorite(2, dup_b).unwrap();
    db.add_favorite(3, survivor).unwrap();

    let report = Deduplicator::new(&db).run(&SilentReporter).unwrap();

    let favorites = db.list_favorites().unwrap();
    assert_eq!(favorites.len(), 3);
    assert!(favorites.iter().all(|f| f.pokemon_id == survivor));
    let mut users: Vec<i64> = favorites.iter().map(|f| f.user_id).collect();
    users.sort();
    assert_eq!(users, vec![1, 2, 3]);

    let group = &report.name_pass.groups[0];
    assert_eq!(group.favorites_moved, 2);
    assert_eq!(group.favorites_dropped, 0);
}

#[test]
fn test_conflicting_favorite_is_dropped() {
    let db = Database::open_in_memory().unwrap();
    let survivor = db.insert_pokemon(&make_pokemon("Psyduck", "psyduck")).unwrap();
    let dup = db.insert_pokemon(&make_pokemon("Psyduck", "psyduck")).unwrap();

    db.add_favorite(42, survivor).unwrap();
    db.add_favorite(42, dup).unwrap();
    db.add_favorite(43, dup).unwrap();

    let report = Deduplicator::new(&db).run(&SilentReporter).unwrap();

    let user_42 = db.favorites_for_user(42).unwrap();
    assert_eq!(user_42.len(), 1);
    assert_eq!(user_42[0].pokemon_id, survivor);

    let user_43 = db.favorites_for_user(43).unwrap();
    assert_eq!(user_43.len(), 1);
    assert_eq!(user_43[0].pokemon_id, survivor);

    let group = &report.name_pass.groups[0];
    assert_eq!(group.favorites_moved, 1);
    assert_eq!(group.favorites_dropped, 1);
    assert!(report.verification.is_clean());
}

#[test]
fn test_same_user_on_two_duplicates_keeps_one_link() {
    let db = Database::open_in_memory().unwrap();
    let survivor = db.insert_pokemon(&make_pokemon("Golduck", "golduck")).unwrap();
    let dup_a = db.insert_pokemon(&make_pokemon("Golduck", "golduck")).unwrap();
    let dup_b = db.insert_pokemon(&make_pokemon("Golduck", "golduck")).unwrap();

    db.add_favorite(9, dup_b).unwrap();
    db.add_favorite(9, dup_a).unwrap();

    let report = Deduplicator::new(&db).run(&SilentReporter).unwrap();

    let favorites = db.favorites_for_user(9).unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].pokemon_id, survivor);
    assert_eq!(report.name_pass.favorites_dropped(), 1);
}

#[test]
fn test_running_twice_deletes_nothing_the_second_time() {
    let db = Database::open_in_memory().unwrap();
    db.insert_pokemon(&make_pokemon("Meowth", "meowth")).unwrap();
    db.insert_pokemon(&make_pokemon("Meowth", "meowth")).unwrap();
    db.insert_pokemon(&make_pokemon("Persian", "persian")).unwrap();
    db.insert_pokemon(&make_pokemon("Persian 2", "persian")).unwrap();

    let first = Deduplicator::new(&db).run(&SilentReporter).unwrap();
    assert_eq!(first.total_deleted(), 2);

    let second = Deduplicator::new(&db).run(&SilentReporter).unwrap();
    assert_eq!(second.total_deleted(), 0);
    assert!(second.nothing_found());
    assert_eq!(second.total_records, 2);
}

#[test]
fn test_name_and_slug_groups_are_resolved_independently() {
    let db = Database::open_in_memory().unwrap();
    // Same name, distinct slugs.
    let abra = db.insert_pokemon(&make_pokemon("Abra", "abra")).unwrap();
    db.insert_pokemon(&make_pokemon("Abra", "abra-1")).unwrap();
    // Same slug, distinct names.
    let kadabra = db.insert_pokemon(&make_pokemon("Kadabra", "kadabra")).unwrap();
    db.insert_pokemon(&make_pokemon("KADABRA", "kadabra")).unwrap();

    let report = Deduplicator::new(&db).run(&SilentReporter).unwrap();

    assert_eq!(report.name_pass.groups.len(), 1);
    assert_eq!(report.name_pass.groups[0].key, "Abra");
    assert_eq!(report.name_pass.groups[0].survivor_id, abra);

    assert_eq!(report.slug_pass.groups.len(), 1);
    assert_eq!(report.slug_pass.groups[0].key, "kadabra");
    assert_eq!(report.slug_pass.groups[0].survivor_id, kadabra);

    assert_eq!(
        names(&db),
        vec![(abra, "Abra".to_string()), (kadabra, "Kadabra".to_string())]
    );
    assert_eq!(report.verification, Verification::Clean);
}

#[test]
fn test_passes_can_run_standalone_in_either_order() {
    let db = Database::open_in_memory().unwrap();
    db.insert_pokemon(&make_pokemon("Machop", "machop")).unwrap();
    db.insert_pokemon(&make_pokemon("Machop", "machop")).unwrap();

    let dedup = Deduplicator::new(&db);
    let slug_pass = dedup.run_pass(KeyField::Slug, &SilentReporter).unwrap();
    assert_eq!(slug_pass.deleted(), 1);

    let name_pass = dedup.run_pass(KeyField::Name, &SilentReporter).unwrap();
    assert!(name_pass.groups.is_empty());
    assert_eq!(audit(&db).unwrap(), Verification::Clean);
}

/// Records the reporter callbacks in order.
#[derive(Default)]
struct RecordingReporter {
    events: Mutex<Vec<String>>,
}

impl CleanupReporter for RecordingReporter {
    fn on_start(&self) {
        self.events.lock().unwrap().push("start".to_string());
    }
    fn on_no_duplicates(&self) {
        self.events.lock().unwrap().push("none".to_string());
    }
    fn on_pass_start(&self, field: KeyField, groups: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("pass {} {}", field, groups));
    }
    fn on_group_start(&self, key: &DuplicateKey) {
        self.events
            .lock()
            .unwrap()
            .push(format!("group {} {}", key.value, key.count));
    }
    fn on_group_resolved(&self, group: &GroupReport) {
        self.events
            .lock()
            .unwrap()
            .push(format!("kept {} deleted {}", group.survivor_id, group.deleted));
    }
    fn on_pass_complete(&self, pass: &PassReport) {
        self.events
            .lock()
            .unwrap()
            .push(format!("done {}", pass.field));
    }
    fn on_complete(&self, report: &pokeworld_core::dedup::report::CleanupReport) {
        self.events
            .lock()
            .unwrap()
            .push(format!("complete {}", report.total_records));
    }
}

#[test]
fn test_reporter_receives_progress_in_order() {
    let db = Database::open_in_memory().unwrap();
    let first = db.insert_pokemon(&make_pokemon("Pikachu", "pikachu")).unwrap();
    db.insert_pokemon(&make_pokemon("Pikachu", "pikachu")).unwrap();
    db.insert_pokemon(&make_pokemon("Bulbasaur", "bulbasaur")).unwrap();

    let reporter = RecordingReporter::default();
    Deduplicator::new(&db).run(&reporter).unwrap();

    let events = reporter.events.into_inner().unwrap();
    assert_eq!(
        events,
        vec![
            "start".to_string(),
            "pass name 1".to_string(),
            "group Pikachu 2".to_string(),
            format!("kept {} deleted 1", first),
            "done name".to_string(),
            "pass slug 0".to_string(),
            "done slug".to_string(),
            "complete 2".to_string(),
        ]
    );
}

#[test]
fn test_reporter_told_when_nothing_to_do() {
    let db = Database::open_in_memory().unwrap();
    db.insert_pokemon(&make_pokemon("Pikachu", "pikachu")).unwrap();

    let reporter = RecordingReporter::default();
    Deduplicator::new(&db).run(&reporter).unwrap();

    let events = reporter.events.into_inner().unwrap();
    assert_eq!(events, vec!["start".to_string(), "none".to_string()]);
}

/// Delegates to a real database but fails the first bulk delete.
struct FailingDeleteStore {
    db: Database,
    fail_next_delete: Cell<bool>,
}

impl DedupStore for FailingDeleteStore {
    fn duplicate_keys(&self, field: KeyField) -> Result<Vec<DuplicateKey>, Error> {
        self.db.duplicate_keys(field)
    }

    fn records_with_key(&self, field: KeyField, key: &str) -> Result<Vec<Pokemon>, Error> {
        self.db.records_with_key(field, key)
    }

    fn redirect_favorites(&self, from_ids: &[i64], to_id: i64) -> Result<RedirectOutcome, Error> {
        self.db.redirect_favorites(from_ids, to_id)
    }

    fn delete_records(&self, ids: &[i64]) -> Result<usize, Error> {
        if self.fail_next_delete.replace(false) {
            return Err(Error::StorageUnavailable(rusqlite::Error::InvalidQuery));
        }
        self.db.delete_records(ids)
    }

    fn count_records(&self) -> Result<i64, Error> {
        self.db.count_records()
    }

    fn atomically<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce() -> Result<T, Error>,
    {
        self.db.atomically(f)
    }
}

#[test]
fn test_failed_group_is_rolled_back() {
    let db = Database::open_in_memory().unwrap();
    let survivor = db.insert_pokemon(&make_pokemon("Onix", "onix")).unwrap();
    let dup = db.insert_pokemon(&make_pokemon("Onix", "onix")).unwrap();
    db.add_favorite(5, dup).unwrap();

    let store = FailingDeleteStore {
        db,
        fail_next_delete: Cell::new(true),
    };

    let result = Deduplicator::new(&store).run(&SilentReporter);
    assert!(matches!(result, Err(Error::StorageUnavailable(_))));

    // Redirect was undone together with the failed delete.
    let favorites = store.db.favorites_for_user(5).unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].pokemon_id, dup);
    assert_eq!(store.db.count_pokemon().unwrap(), 2);

    // A later run completes the repair.
    let report = Deduplicator::new(&store).run(&SilentReporter).unwrap();
    assert_eq!(report.total_deleted(), 1);
    let favorites = store.db.favorites_for_user(5).unwrap();
    assert_eq!(favorites[0].pokemon_id, survivor);
}

#[test]
fn test_on_disk_database_keeps_repair() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pokeworld.db");
    let path = path.to_str().unwrap();

    {
        let db = Database::open(path).unwrap();
        db.insert_pokemon(&make_pokemon("Slowpoke", "slowpoke")).unwrap();
        db.insert_pokemon(&make_pokemon("Slowpoke", "slowpoke")).unwrap();
        Deduplicator::new(&db).run(&SilentReporter).unwrap();
    }

    let reopened = Database::open(path).unwrap();
    assert_eq!(reopened.count_pokemon().unwrap(), 1);
    assert_eq!(audit(&reopened).unwrap(), Verification::Clean);
}
