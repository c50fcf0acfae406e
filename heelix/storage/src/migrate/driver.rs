//! Top-level migration of a data directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use super::migrator::EntityGraphMigrator;
use super::observer::{MigrationObserver, TracingObserver};
use super::version::{DATA_VERSION, read_version, write_version};
use super::{MigrationOutcome, SkipReason};
use crate::error::{MigrationError, MigrationResult};
use crate::layout::DataLayout;
use crate::model::EntityCategory;

/// Migrates a data directory from the legacy graph layout to [`DATA_VERSION`].
///
/// # Migration Process
///
/// 1. Skip if the directory does not exist or is already stamped current
/// 2. Migrate every category in [`EntityCategory::ALL`] order, writing each
///    rebuilt link graph next to its legacy file with a `.tmp` suffix
/// 3. Remove all legacy graph files, then rename every `.tmp` file over them
/// 4. Stamp the directory with the target version
///
/// A failure before step 3 leaves every legacy file intact, and re-running
/// simply overwrites the partial outputs. A failure during step 3 leaves the
/// directory inconsistent and needs an operator; nothing is rolled back.
///
/// The directory must not be used by any other process while this runs.
pub struct MigrationDriver {
    layout: DataLayout,
    target_version: String,
    observer: Arc<dyn MigrationObserver>,
}

impl MigrationDriver {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            layout: DataLayout::new(data_dir),
            target_version: DATA_VERSION.to_string(),
            observer: Arc::new(TracingObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn MigrationObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn run(&self) -> MigrationResult<MigrationOutcome> {
        let data_dir = self.layout.root();
        if !data_dir.exists() {
            return Ok(self.skip(SkipReason::DataDirMissing));
        }

        let deployed_version = read_version(data_dir)?;
        if deployed_version == self.target_version {
            return Ok(self.skip(SkipReason::AlreadyCurrent(deployed_version)));
        }
        self.observer
            .started(data_dir, &deployed_version, &self.target_version);

        let migrator = EntityGraphMigrator::new(&self.layout, self.observer.as_ref());
        let stats = EntityCategory::ALL
            .into_iter()
            .map(|category| migrator.migrate(category))
            .collect::<MigrationResult<Vec<_>>>()?;

        self.swap()?;
        self.observer.swapped(data_dir);

        write_version(data_dir, &self.target_version)?;
        self.observer.finished(data_dir, &self.target_version);

        Ok(MigrationOutcome::Migrated(stats))
    }

    fn skip(&self, reason: SkipReason) -> MigrationOutcome {
        self.observer.skipped(self.layout.root(), &reason);
        MigrationOutcome::Skipped(reason)
    }

    /// Replaces every legacy graph file with its rebuilt counterpart. All
    /// legacy files are removed before the first rename.
    fn swap(&self) -> MigrationResult<()> {
        for category in EntityCategory::ALL {
            let path = self.layout.graph_file(category);
            fs::remove_file(&path).map_err(|source| MigrationError::RemoveLegacy { path, source })?;
        }

        for category in EntityCategory::ALL {
            let from = self.layout.temp_graph_file(category);
            let to = self.layout.graph_file(category);
            fs::rename(&from, &to).map_err(|source| MigrationError::Rename { from, to, source })?;
        }

        Ok(())
    }
}

/// Migrates `data_dir`, reporting through `tracing`.
pub fn migrate<P: AsRef<Path>>(data_dir: P) -> MigrationResult<MigrationOutcome> {
    MigrationDriver::new(data_dir).run()
}
