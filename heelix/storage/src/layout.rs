//! File naming inside a data directory.
//!
//! ```text
//! <data_dir>/
//!   version.txt              schema version stamp
//!   <category>Graph.dat      legacy graph, later the migrated link graph
//!   <category>Graph.dat.tmp  migrated link graph before the swap
//!   <category>Info.dat       entity ids and labels
//!   geoCoords.dat            place coordinates
//! ```

use std::path::{Path, PathBuf};

use crate::model::EntityCategory;

/// Name of the version stamp file.
pub const VERSION_FILE_NAME: &str = "version.txt";
/// Name of the place coordinate file.
pub const GEO_COORDS_FILE_NAME: &str = "geoCoords.dat";
/// Suffix of a link graph written but not yet swapped into place.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Resolves the paths of every file the migration touches.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
}

impl DataLayout {
    /// Lays out files under `root`. Nothing is touched on disk.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The data directory itself.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The version stamp file.
    pub fn version_file(&self) -> PathBuf {
        self.root.join(VERSION_FILE_NAME)
    }

    /// The graph file of a category. Holds the legacy layout before migration
    /// and the link-graph layout after it.
    pub fn graph_file(&self, category: EntityCategory) -> PathBuf {
        self.root.join(format!("{}Graph.dat", category.name()))
    }

    /// Where the rebuilt link graph of a category is written before the swap.
    pub fn temp_graph_file(&self, category: EntityCategory) -> PathBuf {
        self.root
            .join(format!("{}Graph.dat{TEMP_SUFFIX}", category.name()))
    }

    /// The entity id and label file of a category.
    pub fn info_file(&self, category: EntityCategory) -> PathBuf {
        self.root.join(format!("{}Info.dat", category.name()))
    }

    /// The coordinate file written for the place category only.
    pub fn geo_coords_file(&self) -> PathBuf {
        self.root.join(GEO_COORDS_FILE_NAME)
    }
}
