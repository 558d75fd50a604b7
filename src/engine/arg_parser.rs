use clap::Parser;
use std::path::PathBuf;

use crate::utils::config::{DB_BATCH_SIZE, DEFAULT_DB_FILENAME};

/// Index a directory tree into a path-hash addressed catalog.
#[derive(Clone, Parser)]
#[command(name = "treedex")]
#[command(about = "Index a directory tree into a queryable path-hash catalog.")]
pub struct Cli {
    /// Directory to index.
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// Catalog database path. Default: `treedex.db` in the current directory.
    #[arg(long, short)]
    pub db: Option<PathBuf>,

    /// Number of concurrent scanner tasks. Default: logical CPU count.
    #[arg(long, short = 'j')]
    pub jobs: Option<usize>,

    /// Rows per database transaction.
    #[arg(long, short = 'b', default_value_t = DB_BATCH_SIZE)]
    pub db_batch: usize,

    /// Keep an existing database instead of replacing it.
    #[arg(long)]
    pub keep: bool,

    /// Verbose output.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl Cli {
    /// Get the database path, defaulting to the package filename in the
    /// current directory.
    pub fn db_path(&self) -> PathBuf {
        self.db
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILENAME))
    }
}
