//! Entry and stats types shared by the scanner, inserter, and catalog.

use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Kind of filesystem object an entry describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    Dir,
    File,
}

impl EntryKind {
    /// Single-character code stored in the `type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Dir => "d",
            EntryKind::File => "f",
        }
    }
}

/// One catalog row: a directory or non-directory discovered by the scan.
///
/// `path` is the ancestry string: `/`-joined 12-hex-digit ids of all ancestors
/// followed by the entry's own id; empty for the root.
#[derive(Clone, Debug, PartialEq)]
pub struct FileEntry {
    /// 48-bit path hash of the entry's relative path; sign bit always 0.
    pub id: i64,
    /// Id of the parent directory; `None` only for the root.
    pub parent_id: Option<i64>,
    pub path: String,
    /// 0 for the root, parent depth + 1 otherwise.
    pub depth: u32,
    /// Final path component, NFC-normalized; empty for the root.
    pub name: String,
    pub kind: EntryKind,
    /// Size in bytes as reported by stat at scan time.
    pub size: i64,
}

/// Live counters updated by scanner tasks and read by observers.
///
/// Write-mostly for producers, read-rarely for observers; no observer needs a
/// consistent multi-counter snapshot, so relaxed atomics suffice.
#[derive(Debug, Default)]
pub struct ScanStats {
    pub(crate) n_files: AtomicU64,
    pub(crate) total_size: AtomicU64,
    pub(crate) active_workers: AtomicI64,
    pub(crate) queuing_workers: AtomicI64,
}

impl ScanStats {
    pub(crate) fn reset(&self) {
        self.n_files.store(0, Ordering::Relaxed);
        self.total_size.store(0, Ordering::Relaxed);
        self.active_workers.store(0, Ordering::Relaxed);
        self.queuing_workers.store(0, Ordering::Relaxed);
    }

    /// Count one emitted child entry.
    pub(crate) fn record_entry(&self, size: u64) {
        self.n_files.fetch_add(1, Ordering::Relaxed);
        self.total_size.fetch_add(size, Ordering::Relaxed);
    }
}

/// Point-in-time view of the indexing counters.
#[derive(Clone, Copy, Debug, Default)]
pub struct StatsSnapshot {
    /// Entries emitted by the scanners (the root is not counted).
    pub n_files: u64,
    /// Sum of emitted entry sizes in bytes.
    pub total_size: u64,
    /// Scanner tasks currently walking a directory.
    pub active_workers: i64,
    /// Scanner tasks submitted but not yet running (backpressure gauge).
    pub queuing_workers: i64,
    /// Rows handed to the database since the store was opened.
    pub insertions: u64,
}
