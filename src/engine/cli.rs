//! CLI command handler: open the catalog, run the scan with a live stats
//! ticker, then build the read-side indices.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossbeam_channel::{bounded, select, tick};
use log::{debug, info, warn};

use crate::engine::arg_parser::Cli;
use crate::engine::progress::{create_counter, refresh, update_progress};
use crate::engine::{CatalogDb, CatalogOpts};
use crate::error::IndexError;
use crate::pipeline::FileIndexer;
use crate::types::StatsSnapshot;
use crate::utils::config::STATS_TICK_MS;
use crate::utils::setup_logging;

/// Run the index command: scan `cli.dir` into the catalog, then create the
/// read-side indices. On Ctrl+C the partial catalog is kept and index
/// creation is skipped.
pub fn handle_run(cli: &Cli) -> Result<()> {
    setup_logging(cli.verbose);
    let db_path = cli.db_path();
    debug!("using database '{}'", db_path.display());
    let db = Arc::new(
        CatalogDb::open(
            &db_path,
            CatalogOpts {
                reset: !cli.keep,
                batch_size: cli.db_batch,
            },
        )
        .context("could not open catalog database")?,
    );
    let workers = cli.jobs.unwrap_or_else(rayon::current_num_threads);
    let indexer = Arc::new(FileIndexer::new(Arc::clone(&db), workers)?);

    let handler_indexer = Arc::clone(&indexer);
    ctrlc::set_handler(move || {
        warn!("indexing interrupted");
        handler_indexer.interrupt();
    })
    .context("set Ctrl+C handler")?;

    info!("scanning directory '{}'", cli.dir.display());
    let start = Instant::now();
    let (done_tx, done_rx) = bounded::<std::result::Result<(), IndexError>>(1);
    let scan_indexer = Arc::clone(&indexer);
    let root = cli.dir.clone();
    let scan = thread::spawn(move || {
        let _ = done_tx.send(scan_indexer.index_dir(&root));
    });

    let result = run_stats_ticker(&indexer, &done_rx);
    let _ = scan.join();

    match result {
        Ok(()) => {}
        Err(IndexError::Interrupted) => {
            warn!("catalog holds a partial scan; skipping index creation");
            return Ok(());
        }
        Err(e) => return Err(e).context("indexer encountered an error"),
    }

    print_total_stats(start, &indexer.stats());

    let t_indices = Instant::now();
    db.create_indices()
        .context("could not create catalog indices")?;
    info!("catalog indices created in {:?}", t_indices.elapsed());
    Ok(())
}

/// Drive the progress counter from the stats snapshot until the scan thread
/// reports completion.
fn run_stats_ticker(
    indexer: &FileIndexer,
    done_rx: &crossbeam_channel::Receiver<std::result::Result<(), IndexError>>,
) -> std::result::Result<(), IndexError> {
    let bar = create_counter("Indexing");
    refresh(&bar);
    let ticker = tick(Duration::from_millis(STATS_TICK_MS));
    let mut previous = StatsSnapshot::default();
    let mut t_previous = Instant::now();
    loop {
        select! {
            recv(done_rx) -> msg => return msg.unwrap_or(Ok(())),
            recv(ticker) -> _ => {
                let stats = indexer.stats();
                update_progress(&bar, (stats.n_files - previous.n_files) as usize);
                let dt = t_previous.elapsed().as_secs_f64();
                debug!(
                    "{:.0} file/s | {} workers | {} queued | {:.0} insert/s | total {} files, {} bytes",
                    (stats.n_files - previous.n_files) as f64 / dt,
                    stats.active_workers,
                    stats.queuing_workers,
                    (stats.insertions - previous.insertions) as f64 / dt,
                    stats.n_files,
                    stats.total_size,
                );
                previous = stats;
                t_previous = Instant::now();
            }
        }
    }
}

fn print_total_stats(start: Instant, stats: &StatsSnapshot) {
    let dt = start.elapsed();
    info!(
        "indexed {} file(s), total size {} bytes, {:.0} files/s",
        stats.n_files,
        stats.total_size,
        stats.n_files as f64 / dt.as_secs_f64()
    );
    info!("total indexing time {:?}", dt);
}
