//! Error types for the treedex library.
//!
//! Library code returns structured [`IndexError`] values; the CLI boundary
//! wraps them with `anyhow` context. Per-entry walk failures are not errors
//! at this level: the scanner logs and skips them.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Top-level error type for catalog and indexing operations.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Stat or readdir failure not tied to a single child entry; fatal to the
    /// current scan.
    #[error("filesystem error on '{path}': {source}")]
    Filesystem {
        path: PathBuf,
        source: std::io::Error,
    },

    /// SQLite error (insert, commit, prepare, pragma).
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// An absolute path was given where a relative one is required.
    #[error("'{0}' is not a relative path")]
    AbsolutePath(PathBuf),

    /// A hex id string that is not exactly 12 hex digits.
    #[error("'{0}' is not a 12-digit hex id")]
    MalformedHex(String),

    /// An absolute query path that does not live under the indexed root.
    #[error("'{path}' is not under the indexed root '{root}'")]
    OutsideRoot { path: PathBuf, root: PathBuf },

    /// No catalog row for the given id.
    #[error("no catalog entry for id {id:012x}")]
    EntryNotFound { id: i64 },

    /// No value stored under the given key.
    #[error("no value for key '{0}'")]
    KeyNotFound(String),

    /// The name stored at a hashed id does not match the queried path; the
    /// catalog is stale or a 48-bit collision occurred.
    #[error("id {id:012x} has name '{found}', expected '{expected}'")]
    NameMismatch {
        id: i64,
        found: String,
        expected: String,
    },

    /// Orderly shutdown was requested mid-scan; the catalog holds a prefix of
    /// a full scan.
    #[error("indexing interrupted")]
    Interrupted,

    /// Worker pool or thread management failure.
    #[error("worker error: {0}")]
    Worker(String),
}

impl IndexError {
    /// Wrap an I/O error with the path it happened on.
    pub fn fs(path: impl AsRef<Path>, source: impl Into<std::io::Error>) -> Self {
        IndexError::Filesystem {
            path: path.as_ref().to_path_buf(),
            source: source.into(),
        }
    }
}

/// Result type alias used throughout the library.
pub type Result<T> = std::result::Result<T, IndexError>;
