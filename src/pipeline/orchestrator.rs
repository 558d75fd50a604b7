//! Indexer coordinator: wires the scanner pool to the inserter for one scan
//! and owns lifecycle, interrupt propagation, and the stats snapshot.

use std::fs;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{bounded, select, unbounded, Sender};
use crossbeam_utils::sync::WaitGroup;
use log::debug;

use super::{scanner, DirJob, ScanContext};
use crate::engine::db_ops::{CatalogDb, InsertChannels};
use crate::engine::hashing::path_hash;
use crate::error::{IndexError, Result};
use crate::types::{EntryKind, FileEntry, ScanStats, StatsSnapshot};

/// Scan-control messages: normal completion and interrupt.
const SCAN_DONE: i32 = 0;
const SCAN_INTERRUPTED: i32 = 1;

/// Indexes directory trees into a [`CatalogDb`].
///
/// The pool's thread count bounds concurrent scanner tasks; a submitted job
/// waits in the pool queue until a thread frees up, which is the counting
/// semaphore of the design.
pub struct FileIndexer {
    db: Arc<CatalogDb>,
    stats: Arc<ScanStats>,
    pool: Arc<rayon::ThreadPool>,
    /// Live interrupt hook; present only while a scan runs.
    scan_control: Mutex<Option<Sender<i32>>>,
}

impl FileIndexer {
    /// Build an indexer over `db` with at most `num_workers` concurrent
    /// scanner tasks.
    pub fn new(db: Arc<CatalogDb>, num_workers: usize) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_workers.max(1))
            .thread_name(|i| format!("scanner-{i}"))
            .build()
            .map_err(|e| IndexError::Worker(e.to_string()))?;
        Ok(Self {
            db,
            stats: Arc::new(ScanStats::default()),
            pool: Arc::new(pool),
            scan_control: Mutex::new(None),
        })
    }

    /// The catalog this indexer writes to.
    pub fn db(&self) -> &Arc<CatalogDb> {
        &self.db
    }

    /// Non-blocking snapshot of the live counters.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            n_files: self.stats.n_files.load(Ordering::Relaxed),
            total_size: self.stats.total_size.load(Ordering::Relaxed),
            active_workers: self.stats.active_workers.load(Ordering::Relaxed),
            queuing_workers: self.stats.queuing_workers.load(Ordering::Relaxed),
            insertions: self.db.insertions(),
        }
    }

    /// Request an orderly shutdown of a running scan. Idempotent; a no-op
    /// when no scan is active. The interrupted `index_dir` call returns
    /// [`IndexError::Interrupted`] and the catalog keeps a causally-closed
    /// prefix of the full scan.
    pub fn interrupt(&self) {
        if let Some(tx) = self.scan_control.lock().unwrap().as_ref() {
            let _ = tx.try_send(SCAN_INTERRUPTED);
        }
    }

    /// Index the tree rooted at `dir` into the catalog.
    pub fn index_dir(&self, dir: &Path) -> Result<()> {
        self.stats.reset();
        let info = fs::metadata(dir).map_err(|e| IndexError::fs(dir, e))?;
        let root_abs = fs::canonicalize(dir).map_err(|e| IndexError::fs(dir, e))?;
        self.db.set_value("root_input", &dir.to_string_lossy())?;
        self.db.set_value("root_abs", &root_abs.to_string_lossy())?;

        // rendezvous entry channel: the inserter must always be draining
        let (entry_tx, entry_rx) = bounded::<FileEntry>(0);
        let (error_tx, error_rx) = unbounded::<IndexError>();
        let (quit_tx, quit_rx) = bounded::<()>(0);
        let (scan_tx, scan_rx) = bounded::<i32>(1);
        *self.scan_control.lock().unwrap() = Some(scan_tx.clone());

        let inserter = {
            let db = Arc::clone(&self.db);
            let channels = InsertChannels {
                entries: entry_rx,
                quit: quit_rx.clone(),
                errors: error_tx.clone(),
            };
            thread::Builder::new()
                .name("inserter".into())
                .spawn(move || db.run_inserter(channels))
                .map_err(|e| IndexError::Worker(e.to_string()))?
        };

        // emits the root entry, runs the root scanner task, and reports scan
        // completion; kept off the coordinator thread so the select loop
        // below stays responsive
        let scan = {
            let ctx = Arc::new(ScanContext {
                entries: entry_tx,
                errors: error_tx,
                quit: quit_rx,
                stats: Arc::clone(&self.stats),
            });
            let pool = Arc::clone(&self.pool);
            let root = dir.to_path_buf();
            let root_size = info.len() as i64;
            thread::Builder::new()
                .name("scan-root".into())
                .spawn(move || {
                    debug!("scanner starting");
                    let id = match path_hash("") {
                        Ok(id) => id,
                        Err(e) => {
                            let _ = ctx.errors.send(e);
                            let _ = scan_tx.send(SCAN_DONE);
                            return;
                        }
                    };
                    let root_entry = FileEntry {
                        id,
                        parent_id: None,
                        path: String::new(),
                        depth: 0,
                        name: String::new(),
                        kind: EntryKind::Dir,
                        size: root_size,
                    };
                    if scanner::emit(&ctx, root_entry) {
                        let wg = WaitGroup::new();
                        let job = DirJob {
                            path: root,
                            tree_path: String::new(),
                            hash_path: String::new(),
                            depth: 0,
                            id,
                        };
                        let child_ctx = Arc::clone(&ctx);
                        let child_wg = wg.clone();
                        ctx.stats.queuing_workers.fetch_add(1, Ordering::Relaxed);
                        pool.spawn(move || scanner::scan_directory(job, child_ctx, child_wg));
                        wg.wait();
                    }
                    debug!("scanner finished");
                    let _ = scan_tx.send(SCAN_DONE);
                })
                .map_err(|e| IndexError::Worker(e.to_string()))?
        };

        let status = select! {
            recv(scan_rx) -> msg => msg.unwrap_or(SCAN_DONE),
            recv(error_rx) -> msg => {
                let err = msg.unwrap_or_else(|_| IndexError::Worker("error channel closed".into()));
                drop(quit_tx);
                self.clear_scan_control();
                let _ = scan.join();
                let _ = inserter.join();
                return Err(err);
            }
        };
        drop(quit_tx);
        self.clear_scan_control();
        let _ = scan.join();
        let _ = inserter.join();
        if status == SCAN_INTERRUPTED {
            Err(IndexError::Interrupted)
        } else {
            Ok(())
        }
    }

    fn clear_scan_control(&self) {
        *self.scan_control.lock().unwrap() = None;
    }
}
