//! Key/value side-store for run metadata.
//!
//! The core writes `root_input` and `root_abs` before a scan begins so later
//! absolute-path queries can be rebased to a relative form.

use rusqlite::Error as SqlError;

use super::CatalogDb;
use crate::error::{IndexError, Result};

impl CatalogDb {
    /// Upsert a value under `key`.
    pub fn set_value(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached("REPLACE INTO value_map (key, value) VALUES (?1, ?2)")?;
        stmt.execute([key, value])?;
        Ok(())
    }

    /// Fetch the value stored under `key`.
    pub fn get_value(&self, key: &str) -> Result<String> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached("SELECT value FROM value_map WHERE key = ?1")?;
        stmt.query_row([key], |row| row.get(0)).map_err(|e| match e {
            SqlError::QueryReturnedNoRows => IndexError::KeyNotFound(key.to_string()),
            other => IndexError::Database(other),
        })
    }
}
