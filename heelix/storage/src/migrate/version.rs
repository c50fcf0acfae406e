//! The version stamp of a data directory.
//!
//! The stamp is the literal version string in `version.txt`, with no trailing
//! newline. Surrounding whitespace is ignored when reading.

use std::fs;
use std::path::Path;

use crate::error::{MigrationError, MigrationResult};
use crate::layout::DataLayout;

/// Schema version produced by this migration. Bump it whenever the migrated
/// layout changes.
pub const DATA_VERSION: &str = "1.0.0";

/// Reads the stamp of `data_dir`.
///
/// A missing or unreadable stamp is an error; callers decide whether that
/// means "legacy" or "unknown".
pub fn read_version<P: AsRef<Path>>(data_dir: P) -> MigrationResult<String> {
    let path = DataLayout::new(data_dir).version_file();
    match fs::read_to_string(&path) {
        Ok(contents) => Ok(contents.trim().to_string()),
        Err(source) => Err(MigrationError::ReadVersion { path, source }),
    }
}

/// Overwrites the stamp of `data_dir` with `version`.
pub fn write_version<P: AsRef<Path>>(data_dir: P, version: &str) -> MigrationResult<()> {
    let path = DataLayout::new(data_dir).version_file();
    fs::write(&path, version).map_err(|source| MigrationError::WriteVersion { path, source })
}

/// Compatibility of a data directory with a target version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StampStatus {
    /// Stamped with the target version.
    Current,
    /// Stamped with a different version.
    Stale(String),
    /// No readable stamp. Compatibility must not be assumed.
    Unknown,
}

/// Compares the stamp of `data_dir` with `target_version`.
pub fn stamp_status<P: AsRef<Path>>(data_dir: P, target_version: &str) -> StampStatus {
    match read_version(data_dir) {
        Ok(version) if version == target_version => StampStatus::Current,
        Ok(version) => StampStatus::Stale(version),
        Err(_) => StampStatus::Unknown,
    }
}

/// Creates `data_dir` stamped with [`DATA_VERSION`] if it does not exist yet.
///
/// Returns `true` if the directory was created, leaving any report to the
/// caller. An existing directory is left untouched, stamped or not.
pub fn init_data_dir<P: AsRef<Path>>(data_dir: P) -> MigrationResult<bool> {
    let data_dir = data_dir.as_ref();
    if data_dir.exists() {
        return Ok(false);
    }

    fs::create_dir_all(data_dir).map_err(|source| MigrationError::CreateDataDir {
        path: data_dir.to_path_buf(),
        source,
    })?;
    write_version(data_dir, DATA_VERSION)?;
    Ok(true)
}
