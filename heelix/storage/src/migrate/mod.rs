//! One-shot migration of a data directory from the legacy monolithic graph
//! files to the split entity-info / link-graph / geo-coordinate layout.
//!
//! The migration is gated by the directory's version stamp: a directory
//! already stamped with [`DATA_VERSION`] is left alone, so running it twice
//! performs file I/O only once.

mod driver;
mod migrator;
mod observer;
mod version;

use std::fmt;

pub use driver::{MigrationDriver, migrate};
pub use migrator::{EntityGraphMigrator, migrate_streams};
pub use observer::{MigrationObserver, TracingObserver};
pub use version::{
    DATA_VERSION, StampStatus, init_data_dir, read_version, stamp_status, write_version,
};

use crate::model::EntityCategory;

/// Why a migration run did nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The data directory has never been initialised.
    DataDirMissing,
    /// The directory is already stamped with the target version.
    AlreadyCurrent(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::DataDirMissing => f.write_str("data directory does not exist"),
            SkipReason::AlreadyCurrent(version) => {
                write!(f, "data is already at version {version}")
            }
        }
    }
}

/// Result of a migration run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    Skipped(SkipReason),
    /// Stats of every migrated category, in migration order.
    Migrated(Vec<CategoryStats>),
}

/// Counters collected while migrating one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryStats {
    pub category: EntityCategory,
    /// Entity records declared by the legacy header.
    pub entities: usize,
    /// Records in the legacy document section.
    pub documents_read: usize,
    /// Documents in the rebuilt document section.
    pub documents_written: usize,
    pub documents_without_entities: usize,
    /// Records in the entity section.
    pub entity_links: usize,
    pub entities_without_documents: usize,
}

impl CategoryStats {
    pub fn new(category: EntityCategory) -> Self {
        Self {
            category,
            entities: 0,
            documents_read: 0,
            documents_written: 0,
            documents_without_entities: 0,
            entity_links: 0,
            entities_without_documents: 0,
        }
    }
}
