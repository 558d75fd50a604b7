//! Read-side catalog queries: name, parent id, reconstructed path, and the
//! verified path → id lookup.

use std::path::Path;

use rusqlite::Error as SqlError;

use super::CatalogDb;
use crate::engine::hashing::{hex_to_hash, normalize_path, path_hash};
use crate::error::{IndexError, Result};

impl CatalogDb {
    /// Name of the entry with the given id. The root's name is empty.
    pub fn get_name(&self, id: i64) -> Result<String> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached("SELECT name FROM tree WHERE id = ?1")?;
        stmt.query_row([id], |row| row.get(0))
            .map_err(|e| entry_error(id, e))
    }

    /// Parent id of the entry with the given id; `None` for the root.
    pub fn get_parent_id(&self, id: i64) -> Result<Option<i64>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare_cached("SELECT parent_id FROM tree WHERE id = ?1")?;
        stmt.query_row([id], |row| row.get(0))
            .map_err(|e| entry_error(id, e))
    }

    /// Full relative path of the entry, reconstructed from its stored ancestry
    /// string. Names come back NFC-normalized, which may differ from the
    /// original on-disk bytes. The root reconstructs to the empty string.
    pub fn get_path(&self, id: i64) -> Result<String> {
        let ancestry: String = {
            let conn = self.conn.lock().unwrap();
            let mut stmt = conn.prepare_cached("SELECT path FROM tree WHERE id = ?1")?;
            stmt.query_row([id], |row| row.get(0))
                .map_err(|e| entry_error(id, e))?
        };
        if ancestry.is_empty() {
            return Ok(String::new());
        }
        let mut names = Vec::new();
        for seg in ancestry.split('/') {
            names.push(self.get_name(hex_to_hash(seg)?)?);
        }
        Ok(names.join("/"))
    }

    /// Id of the entry at `path`. Absolute paths are rebased against the
    /// stored `root_abs`; relative paths are lexically cleaned. The computed
    /// hash is verified against the stored name; a mismatch means a stale
    /// catalog or a 48-bit collision.
    pub fn get_id(&self, path: &str) -> Result<i64> {
        let p = Path::new(path);
        let rel = if p.is_absolute() {
            let root = self.get_value("root_abs")?;
            let rel = p.strip_prefix(&root).map_err(|_| IndexError::OutsideRoot {
                path: p.to_path_buf(),
                root: root.clone().into(),
            })?;
            rel.to_string_lossy().into_owned()
        } else {
            path.to_string()
        };
        let norm = normalize_path(&rel)?;
        let id = path_hash(&norm)?;
        let name = self.get_name(id)?;
        let expected = norm.rsplit('/').next().unwrap_or(norm.as_str());
        if name != expected {
            return Err(IndexError::NameMismatch {
                id,
                found: name,
                expected: expected.to_string(),
            });
        }
        Ok(id)
    }
}

fn entry_error(id: i64, e: SqlError) -> IndexError {
    match e {
        SqlError::QueryReturnedNoRows => IndexError::EntryNotFound { id },
        other => IndexError::Database(other),
    }
}
