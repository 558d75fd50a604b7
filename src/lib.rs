//! Treedex: catalog a filesystem tree into a queryable SQLite index keyed by
//! 48-bit path hashes.
//!
//! The pipeline is a bounded-parallel directory walker feeding typed entries
//! into a single-writer batched transactional sink. Ids are a pure function
//! of the NFC-normalized relative path, so the catalog answers path → id
//! without storing path strings on the hot path; each row carries only a
//! compact ancestry string of ancestor ids.
//!
//! ```ignore
//! let db = Arc::new(CatalogDb::open(&path, CatalogOpts { reset: true, ..Default::default() })?);
//! let indexer = FileIndexer::new(Arc::clone(&db), 8)?;
//! indexer.index_dir(Path::new("/srv/data"))?;
//! db.create_indices()?;
//! let id = db.get_id("projects/report.pdf")?;
//! assert_eq!(db.get_path(id)?, "projects/report.pdf");
//! ```

pub mod engine;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use engine::db_ops::{CatalogDb, CatalogOpts};
pub use error::{IndexError, Result};
pub use pipeline::FileIndexer;
