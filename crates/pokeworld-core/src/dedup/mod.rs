pub mod report;

use crate::error::Error;
use crate::progress::CleanupReporter;
use crate::storage::models::{DuplicateKey, KeyField, Pokemon, RedirectOutcome};
use report::{CleanupReport, GroupReport, PassReport, Verification};
use tracing::{debug, info, warn};

/// Storage operations the deduplicator needs.
pub trait DedupStore {
    /// Keys of `field` shared by more than one record, ascending.
    fn duplicate_keys(&self, field: KeyField) -> Result<Vec<DuplicateKey>, Error>;

    /// All records whose `field` equals `key`, ordered by id ascending.
    fn records_with_key(&self, field: KeyField, key: &str) -> Result<Vec<Pokemon>, Error>;

    /// Point every favorite referencing `from_ids` at `to_id`. Links that
    /// would duplicate an existing (user, `to_id`) pair are removed instead.
    fn redirect_favorites(&self, from_ids: &[i64], to_id: i64) -> Result<RedirectOutcome, Error>;

    fn delete_records(&self, ids: &[i64]) -> Result<usize, Error>;

    fn count_records(&self) -> Result<i64, Error>;

    /// Run `f` so that either all of its writes apply or none do.
    fn atomically<T, F>(&self, f: F) -> Result<T, Error>
    where
        F: FnOnce() -> Result<T, Error>;
}

/// Scan both key fields for values shared by more than one record.
pub fn audit<S: DedupStore>(store: &S) -> Result<Verification, Error> {
    let names = store.duplicate_keys(KeyField::Name)?;
    let slugs = store.duplicate_keys(KeyField::Slug)?;

    if names.is_empty() && slugs.is_empty() {
        Ok(Verification::Clean)
    } else {
        Ok(Verification::DuplicatesRemain { names, slugs })
    }
}

/// Collapses records sharing a name or slug into the lowest-id record of the
/// group, moving favorites onto it before the others are deleted.
pub struct Deduplicator<'a, S: DedupStore> {
    store: &'a S,
}

impl<'a, S: DedupStore> Deduplicator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Name pass, then slug pass, then a verification scan.
    pub fn run(&self, reporter: &dyn CleanupReporter) -> Result<CleanupReport, Error> {
        reporter.on_start();

        if audit(self.store)?.is_clean() {
            info!("No duplicate names or slugs found");
            reporter.on_no_duplicates();
            return Ok(CleanupReport {
                name_pass: PassReport::empty(KeyField::Name),
                slug_pass: PassReport::empty(KeyField::Slug),
                total_records: self.store.count_records()?,
                verification: Verification::Clean,
            });
        }

        let name_pass = self.run_pass(KeyField::Name, reporter)?;
        let slug_pass = self.run_pass(KeyField::Slug, reporter)?;
        let total_records = self.store.count_records()?;

        let verification = audit(self.store)?;
        if let Verification::DuplicatesRemain { names, slugs } = &verification {
            warn!(
                "{} names and {} slugs still duplicated after cleanup",
                names.len(),
                slugs.len()
            );
        }

        let report = CleanupReport {
            name_pass,
            slug_pass,
            total_records,
            verification,
        };
        info!(
            "Cleanup removed {} records, {} remain",
            report.total_deleted(),
            report.total_records
        );
        reporter.on_complete(&report);
        Ok(report)
    }

    /// Resolve every duplicate group for one field. Safe to run on its own.
    pub fn run_pass(
        &self,
        field: KeyField,
        reporter: &dyn CleanupReporter,
    ) -> Result<PassReport, Error> {
        let keys = self.store.duplicate_keys(field)?;
        reporter.on_pass_start(field, keys.len());

        let mut pass = PassReport::empty(field);
        for key in &keys {
            reporter.on_group_start(key);
            let group = self.resolve_group(key)?;
            reporter.on_group_resolved(&group);
            pass.groups.push(group);
        }

        debug!(
            "{} pass: {} groups, {} deleted",
            field,
            pass.groups.len(),
            pass.deleted()
        );
        reporter.on_pass_complete(&pass);
        Ok(pass)
    }

    fn resolve_group(&self, key: &DuplicateKey) -> Result<GroupReport, Error> {
        let records = self.store.records_with_key(key.field, &key.value)?;
        let survivor_id = records
            .iter()
            .map(|p| p.id)
            .min()
            .ok_or_else(|| {
                Error::Invariant(format!(
                    "duplicate group for {} '{}' has no records",
                    key.field, key.value
                ))
            })?;
        let duplicate_ids: Vec<i64> = records
            .iter()
            .map(|p| p.id)
            .filter(|id| *id != survivor_id)
            .collect();

        let (outcome, deleted) = self.store.atomically(|| {
            let outcome = self.store.redirect_favorites(&duplicate_ids, survivor_id)?;
            let deleted = self.store.delete_records(&duplicate_ids)?;
            Ok((outcome, deleted))
        })?;

        debug!(
            "{} '{}': kept {}, deleted {:?}",
            key.field, key.value, survivor_id, duplicate_ids
        );
        Ok(GroupReport {
            field: key.field,
            key: key.value.clone(),
            found: records.len(),
            survivor_id,
            deleted,
            favorites_moved: outcome.moved,
            favorites_dropped: outcome.dropped,
        })
    }
}
