use crate::storage::models::{DuplicateKey, KeyField};

/// What happened to one group of records sharing a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
    pub field: KeyField,
    pub key: String,
    pub found: usize,
    pub survivor_id: i64,
    pub deleted: usize,
    pub favorites_moved: usize,
    pub favorites_dropped: usize,
}

/// One sweep over one key field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub field: KeyField,
    pub groups: Vec<GroupReport>,
}

impl PassReport {
    pub fn empty(field: KeyField) -> Self {
        Self {
            field,
            groups: Vec::new(),
        }
    }

    pub fn deleted(&self) -> usize {
        self.groups.iter().map(|g| g.deleted).sum()
    }

    pub fn favorites_dropped(&self) -> usize {
        self.groups.iter().map(|g| g.favorites_dropped).sum()
    }
}

/// Outcome of the post-cleanup duplicate scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    Clean,
    DuplicatesRemain {
        names: Vec<DuplicateKey>,
        slugs: Vec<DuplicateKey>,
    },
}

impl Verification {
    pub fn is_clean(&self) -> bool {
        matches!(self, Verification::Clean)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub name_pass: PassReport,
    pub slug_pass: PassReport,
    pub total_records: i64,
    pub verification: Verification,
}

impl CleanupReport {
    /// True when neither pass found anything to merge.
    pub fn nothing_found(&self) -> bool {
        self.name_pass.groups.is_empty() && self.slug_pass.groups.is_empty()
    }

    pub fn total_deleted(&self) -> usize {
        self.name_pass.deleted() + self.slug_pass.deleted()
    }
}
