//! Engine module: path hashing, catalog database, CLI plumbing.

pub mod arg_parser;
pub mod cli;
pub mod db_ops;
pub mod hashing;
pub mod progress;

// Re-export commonly used items
pub use arg_parser::Cli;
pub use cli::handle_run;
pub use db_ops::{CatalogDb, CatalogOpts};
pub use hashing::{hash_to_hex, hex_to_hash, md5_48, normalize_path, path_hash, step_hash};
