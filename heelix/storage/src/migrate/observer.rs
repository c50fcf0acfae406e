//! Progress and anomaly reporting for a migration run.

use std::path::Path;

use tracing::{debug, info, warn};

use super::{CategoryStats, SkipReason};
use crate::model::EntityCategory;

/// Receives progress and anomaly reports from a migration.
///
/// Every callback has an empty default, so an observer only overrides what it
/// cares about. Anomalies reported here never fail the migration.
pub trait MigrationObserver: Send + Sync {
    fn skipped(&self, _data_dir: &Path, _reason: &SkipReason) {}

    fn started(&self, _data_dir: &Path, _from_version: &str, _to_version: &str) {}

    fn category_started(&self, _category: EntityCategory) {}

    fn header_decoded(&self, _category: EntityCategory, _type_tag: &str, _entity_count: usize) {}

    /// Reported once per category with the number of legacy documents that
    /// had no related entities and were left out of the rebuilt graph.
    fn documents_without_entities(&self, _category: EntityCategory, _count: usize) {}

    /// Reported for every entity whose related-document list is empty.
    fn entity_without_documents(&self, _category: EntityCategory, _index: usize, _entity_id: i64) {}

    fn category_finished(&self, _stats: &CategoryStats) {}

    fn swapped(&self, _data_dir: &Path) {}

    fn finished(&self, _data_dir: &Path, _version: &str) {}
}

/// More than half of the legacy documents of a category had no entities.
fn mostly_without_entities(stats: &CategoryStats) -> bool {
    stats.documents_without_entities * 2 > stats.documents_read
}

/// Reports every callback as a `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl MigrationObserver for TracingObserver {
    fn skipped(&self, data_dir: &Path, reason: &SkipReason) {
        info!(data_dir = %data_dir.display(), "skipping migration: {reason}");
    }

    fn started(&self, data_dir: &Path, from_version: &str, to_version: &str) {
        info!(
            data_dir = %data_dir.display(),
            from_version,
            to_version,
            "migrating data"
        );
    }

    fn category_started(&self, category: EntityCategory) {
        info!(%category, "migrating graph");
    }

    fn header_decoded(&self, category: EntityCategory, type_tag: &str, entity_count: usize) {
        debug!(%category, type_tag, entity_count, "decoded legacy header");
    }

    fn documents_without_entities(&self, category: EntityCategory, count: usize) {
        if count > 0 {
            info!(%category, count, "documents had no associated entities");
        }
    }

    fn entity_without_documents(&self, category: EntityCategory, index: usize, entity_id: i64) {
        warn!(%category, index, entity_id, "entity had no associated documents");
    }

    fn category_finished(&self, stats: &CategoryStats) {
        info!(
            category = %stats.category,
            entities = stats.entities,
            documents_read = stats.documents_read,
            documents_written = stats.documents_written,
            entity_links = stats.entity_links,
            "graph migrated"
        );
        if mostly_without_entities(stats) {
            warn!(
                category = %stats.category,
                documents_without_entities = stats.documents_without_entities,
                documents_read = stats.documents_read,
                "most documents have no associated entities"
            );
        }
    }

    fn swapped(&self, data_dir: &Path) {
        debug!(data_dir = %data_dir.display(), "replaced legacy graph files");
    }

    fn finished(&self, data_dir: &Path, version: &str) {
        info!(data_dir = %data_dir.display(), version, "data migrated");
    }
}
