//! Error types for the storage crate.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::EntityCategory;

/// Errors raised while encoding or decoding a binary entity stream.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The stream ended before a fixed-width field could be read.
    #[error("Stream is truncated: expected {expected} more bytes for {field}")]
    Truncated { field: &'static str, expected: u64 },

    /// A length prefix claims more bytes than the stream holds.
    #[error("Length prefix of {declared} bytes runs past end of stream ({available} available)")]
    LengthPastEnd { declared: u64, available: u64 },

    /// A length or count prefix is negative.
    #[error("Negative {field}: {value}")]
    NegativeLength { field: &'static str, value: i64 },

    /// A length does not fit the integer width of the target field.
    #[error("{field} of {value} does not fit the encoded width")]
    Overflow { field: &'static str, value: usize },

    /// Text payload is not valid UTF-8.
    #[error("Text field is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Fatal errors that abort a migration.
///
/// None of these are retried. The legacy graph files stay untouched for every
/// variant raised before the swap phase begins.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// The legacy graph of a category is malformed, or one of its outputs
    /// could not be encoded.
    #[error("Failed to migrate '{category}' graph: {source}")]
    Category {
        /// Category whose graph was being migrated.
        category: EntityCategory,
        #[source]
        source: CodecError,
    },

    /// A migrated file could not be decoded.
    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        /// File being decoded.
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    /// A legacy graph or migrated file could not be opened for reading.
    #[error("Failed to open {}: {source}", path.display())]
    Open {
        /// File that failed to open.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// An output file could not be created.
    #[error("Failed to create {}: {source}", path.display())]
    Create {
        /// Output file that failed to be created.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Buffered output could not be flushed or synced to disk.
    #[error("Failed to finish writing {}: {source}", path.display())]
    Finish {
        /// Output file being finished.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A legacy graph file could not be removed during the swap.
    #[error("Failed to remove legacy file {}: {source}", path.display())]
    RemoveLegacy {
        /// Legacy graph file that is still in place.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A rebuilt link graph could not be renamed over its legacy file.
    #[error("Failed to rename {} to {}: {source}", from.display(), to.display())]
    Rename {
        /// The `.tmp` link graph.
        from: PathBuf,
        /// The graph file it should have replaced.
        to: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The version stamp is missing or unreadable.
    #[error("Failed to read version stamp {}: {source}", path.display())]
    ReadVersion {
        /// Path of the stamp file.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The version stamp could not be written.
    #[error("Failed to write version stamp {}: {source}", path.display())]
    WriteVersion {
        /// Path of the stamp file.
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A missing data directory could not be created.
    #[error("Failed to create data directory {}: {source}", path.display())]
    CreateDataDir {
        /// Data directory being created.
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for migration operations.
pub type MigrationResult<T> = Result<T, MigrationError>;
