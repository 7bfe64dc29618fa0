use crate::dedup::report::{CleanupReport, GroupReport, PassReport};
use crate::storage::models::{DuplicateKey, KeyField};

/// Trait for reporting duplicate cleanup progress.
///
/// The CLI implements it with printed lines and a progress bar.
/// All methods have default no-op implementations.
pub trait CleanupReporter: Send + Sync {
    fn on_start(&self) {}
    fn on_no_duplicates(&self) {}
    fn on_pass_start(&self, _field: KeyField, _groups: usize) {}
    fn on_group_start(&self, _key: &DuplicateKey) {}
    fn on_group_resolved(&self, _group: &GroupReport) {}
    fn on_pass_complete(&self, _pass: &PassReport) {}
    fn on_complete(&self, _report: &CleanupReport) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl CleanupReporter for SilentReporter {}
