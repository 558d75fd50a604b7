//! Single-writer insert loop: drains the entry channel into batched
//! transactions.
//!
//! The inserter is the only component that mutates the catalog during a scan.
//! Batching amortizes per-transaction cost across thousands of rows while
//! bounding the window of data lost on a crash to one batch.

use std::sync::atomic::Ordering;

use crossbeam_channel::{select, Receiver, Sender};
use log::debug;
use rusqlite::{params, Transaction};
use unicode_normalization::UnicodeNormalization;

use super::{CatalogDb, INSERT_TREE_SQL};
use crate::error::{IndexError, Result};
use crate::types::FileEntry;

/// Channel ends handed to [`CatalogDb::run_inserter`].
pub struct InsertChannels {
    pub entries: Receiver<FileEntry>,
    /// Closed by the coordinator once the scan is over.
    pub quit: Receiver<()>,
    pub errors: Sender<IndexError>,
}

impl CatalogDb {
    /// Consume entries until the quit channel closes, grouping inserts into
    /// transactions of `batch_size` rows. The open transaction is committed on
    /// quit, so an interrupted scan keeps every row received so far.
    pub fn run_inserter(&self, c: InsertChannels) {
        debug!("inserter started");
        loop {
            let mut conn = self.conn.lock().unwrap();
            let tx = match conn.transaction() {
                Ok(tx) => tx,
                Err(e) => {
                    let _ = c.errors.send(e.into());
                    return;
                }
            };
            for _ in 0..self.batch_size {
                select! {
                    recv(c.entries) -> msg => match msg {
                        Ok(mut entry) => {
                            entry.name = entry.name.nfc().collect();
                            match insert_entry(&tx, &entry) {
                                Ok(()) => {
                                    self.insertions.fetch_add(1, Ordering::Relaxed);
                                }
                                Err(e) => {
                                    let _ = c.errors.send(e);
                                }
                            }
                        }
                        // every producer is gone; the scan is over
                        Err(_) => {
                            commit(tx, &c.errors);
                            debug!("inserter quitting (producers gone)");
                            return;
                        }
                    },
                    recv(c.quit) -> _ => {
                        commit(tx, &c.errors);
                        debug!("inserter quitting");
                        return;
                    }
                }
            }
            if let Err(e) = tx.commit() {
                let _ = c.errors.send(e.into());
                return;
            }
        }
    }
}

fn insert_entry(tx: &Transaction<'_>, e: &FileEntry) -> Result<()> {
    let mut stmt = tx.prepare_cached(INSERT_TREE_SQL)?;
    stmt.execute(params![
        e.id,
        e.parent_id,
        e.path,
        e.depth,
        e.name,
        e.kind.as_str(),
        e.size
    ])?;
    Ok(())
}

fn commit(tx: Transaction<'_>, errors: &Sender<IndexError>) {
    if let Err(e) = tx.commit() {
        let _ = errors.send(e.into());
    }
}
