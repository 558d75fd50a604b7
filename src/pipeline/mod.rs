//! Concurrent scan pipeline: bounded scanner fan-out feeding a single
//! batched inserter.

pub mod orchestrator;
pub mod scanner;

pub use orchestrator::FileIndexer;

use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};

use crate::error::IndexError;
use crate::types::{FileEntry, ScanStats};

/// Everything a scanner task needs besides its own [`DirJob`]. Shared by
/// every task of one scan via `Arc`.
pub(crate) struct ScanContext {
    /// Rendezvous channel into the inserter.
    pub entries: Sender<FileEntry>,
    pub errors: Sender<IndexError>,
    /// Closed by the coordinator to request shutdown.
    pub quit: Receiver<()>,
    pub stats: Arc<ScanStats>,
}

/// Per-directory traversal state owned by one scanner task.
pub(crate) struct DirJob {
    /// On-disk path of the directory to walk.
    pub path: PathBuf,
    /// Relative path from the root: `/`-joined NFC names, empty for the root.
    pub tree_path: String,
    /// Ancestry string of hex ids, empty for the root.
    pub hash_path: String,
    pub depth: u32,
    /// Path hash of `tree_path`.
    pub id: i64,
}
