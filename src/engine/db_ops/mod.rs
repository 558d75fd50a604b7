//! Catalog database: schema, pragmas, batched inserts, and read-side queries.
//!
//! One file per catalog. The `tree` table and the `view_tree_hex` view are the
//! compatibility contract with anything that reads the file directly; ids are
//! 48-bit path hashes with the sign bit clear.

pub mod inserter;
pub mod keyval;
pub mod queries;

pub use inserter::InsertChannels;

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use rusqlite::Connection;

use crate::error::{IndexError, Result};
use crate::utils::config::DB_BATCH_SIZE;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS tree (
    id INTEGER PRIMARY KEY,
    parent_id INTEGER NULL REFERENCES tree (id),
    path TEXT NOT NULL,
    depth INTEGER NOT NULL,
    name TEXT NOT NULL,
    type TEXT NOT NULL,
    size INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS value_map (
    key TEXT PRIMARY KEY,
    value TEXT
);

CREATE VIEW IF NOT EXISTS view_tree_hex AS
    SELECT
        printf('%012x', id) AS id,
        CASE
            WHEN parent_id NOT NULL THEN printf('%012x', parent_id)
            ELSE NULL
        END parent_id,
        path, depth, name, type, size
    FROM tree;
"#;

const INSERT_TREE_SQL: &str =
    "INSERT INTO tree (id, parent_id, path, depth, name, type, size) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)";

/// Created after the scan completes so bulk insert is not slowed by index
/// maintenance.
const CREATE_INDICES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS index_path ON tree(path)",
    "CREATE INDEX IF NOT EXISTS index_parent_id ON tree(parent_id)",
];

/// Options for opening a catalog database.
#[derive(Clone, Copy, Debug)]
pub struct CatalogOpts {
    /// Remove any existing database file first.
    pub reset: bool,
    /// Rows per insert transaction.
    pub batch_size: usize,
}

impl Default for CatalogOpts {
    fn default() -> Self {
        Self {
            reset: false,
            batch_size: DB_BATCH_SIZE,
        }
    }
}

/// Owns the connection to one catalog file.
///
/// The connection sits behind a mutex so the handle stays usable for queries
/// while the inserter thread writes during a scan; the single-writer invariant
/// is protocol (only the inserter locks the connection while a scan runs).
pub struct CatalogDb {
    conn: Mutex<Connection>,
    batch_size: usize,
    insertions: AtomicU64,
}

impl CatalogDb {
    /// Open or create the catalog at `path`, removing it first when
    /// `opts.reset` is set.
    pub fn open(path: &Path, opts: CatalogOpts) -> Result<Self> {
        if opts.reset {
            remove_db_files(path)?;
        }
        let conn = Connection::open(path)?;
        apply_pragmas(&conn)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            batch_size: opts.batch_size.max(1),
            insertions: AtomicU64::new(0),
        })
    }

    /// In-memory catalog with the same schema (tests and scratch use).
    pub fn open_in_memory(batch_size: usize) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
            batch_size: batch_size.max(1),
            insertions: AtomicU64::new(0),
        })
    }

    /// Build the read-side indices. Call after a scan completes.
    pub fn create_indices(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        for sql in CREATE_INDICES {
            conn.execute(sql, [])?;
        }
        conn.execute("ANALYZE", [])?;
        Ok(())
    }

    /// Rows handed to the database since the store was opened.
    pub fn insertions(&self) -> u64 {
        self.insertions.load(Ordering::Relaxed)
    }

    /// Close the underlying connection.
    pub fn close(self) -> Result<()> {
        self.conn
            .into_inner()
            .unwrap()
            .close()
            .map_err(|(_, e)| IndexError::Database(e))
    }
}

fn apply_pragmas(conn: &Connection) -> Result<()> {
    // journal_mode returns a row; the others do not
    conn.query_row("PRAGMA journal_mode = WAL", [], |_| Ok(()))?;
    conn.execute_batch(
        r#"
        PRAGMA synchronous = NORMAL;
        PRAGMA case_sensitive_like = ON;
        "#,
    )?;
    Ok(())
}

/// Remove the database file and its WAL sidecars, ignoring missing files.
fn remove_db_files(path: &Path) -> Result<()> {
    for suffix in ["", "-wal", "-shm"] {
        let mut p = path.as_os_str().to_os_string();
        p.push(suffix);
        match std::fs::remove_file(&p) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(IndexError::fs(path, e)),
        }
    }
    Ok(())
}
