//! Treedex CLI: index a directory tree into a path-hash catalog.

use anyhow::Result;
use clap::Parser;
use std::time::Instant;
use treedex::engine::{handle_run, Cli};

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    handle_run(&cli)?;
    log::debug!("total time: {:?}", start_time.elapsed());
    Ok(())
}
