//! Application configuration constants.
//! Tuning and thresholds in one place.

/// Rows per insert transaction. Amortizes per-transaction cost across
/// thousands of rows while bounding the window of data lost on crash to one
/// batch.
pub const DB_BATCH_SIZE: usize = 10_000;

/// Database filename used when the CLI is not given an explicit path.
pub const DEFAULT_DB_FILENAME: &str = "treedex.db";

/// Interval between stats ticks in the CLI progress display (milliseconds).
pub const STATS_TICK_MS: u64 = 500;
