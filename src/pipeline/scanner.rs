//! Scanner task: walk one directory level, emit child entries, and schedule a
//! new task per subdirectory.
//!
//! Offloading descent to fresh tasks keeps each task's work bounded to one
//! directory's children, so the worker pool throttles the whole traversal
//! uniformly regardless of tree shape.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use crossbeam_channel::select;
use crossbeam_utils::sync::WaitGroup;
use log::warn;
use unicode_normalization::UnicodeNormalization;
use walkdir::WalkDir;

use super::{DirJob, ScanContext};
use crate::engine::hashing::{hash_to_hex, path_hash};
use crate::error::IndexError;
use crate::types::{EntryKind, FileEntry};

/// Append `extra` to a `/`-joined path; an empty parent yields just `extra`.
fn path_append(path: &str, extra: &str) -> String {
    if path.is_empty() {
        extra.to_string()
    } else {
        format!("{}/{}", path, extra)
    }
}

/// Send one entry, giving up if shutdown was requested first. Returns false
/// when the scan should stop.
pub(crate) fn emit(ctx: &ScanContext, entry: FileEntry) -> bool {
    select! {
        send(ctx.entries, entry) -> res => res.is_ok(),
        recv(ctx.quit) -> _ => false,
    }
}

/// Walk `job`'s directory one level deep. Each child is hashed and emitted;
/// child directories are scheduled as new scanner tasks on the current pool.
/// Unreadable children are logged and skipped: a partial index beats an
/// aborted scan.
pub(crate) fn scan_directory(job: DirJob, ctx: Arc<ScanContext>, wg: WaitGroup) {
    ctx.stats.queuing_workers.fetch_sub(1, Ordering::Relaxed);
    ctx.stats.active_workers.fetch_add(1, Ordering::Relaxed);

    for item in WalkDir::new(&job.path).min_depth(1).max_depth(1) {
        let entry = match item {
            Ok(entry) => entry,
            Err(err) => {
                // an error naming the directory itself means readdir failed
                if err.path() == Some(job.path.as_path()) {
                    let _ = ctx.errors.send(IndexError::fs(&job.path, err));
                    break;
                }
                warn!("skipping unreadable entry: {}", err);
                continue;
            }
        };
        let info = match entry.metadata() {
            Ok(info) => info,
            Err(err) => {
                warn!("skipping '{}': {}", entry.path().display(), err);
                continue;
            }
        };
        let name: String = entry.file_name().to_string_lossy().nfc().collect();
        let tree_path = path_append(&job.tree_path, &name);
        let id = match path_hash(&tree_path) {
            Ok(id) => id,
            Err(e) => {
                let _ = ctx.errors.send(e);
                break;
            }
        };
        let hash_path = path_append(&job.hash_path, &hash_to_hex(id));
        let is_dir = info.is_dir();
        let child = FileEntry {
            id,
            parent_id: Some(job.id),
            path: hash_path.clone(),
            depth: job.depth + 1,
            name,
            kind: if is_dir { EntryKind::Dir } else { EntryKind::File },
            size: info.len() as i64,
        };
        if !emit(&ctx, child) {
            break;
        }
        ctx.stats.record_entry(info.len());
        if is_dir {
            let job = DirJob {
                path: entry.into_path(),
                tree_path,
                hash_path,
                depth: job.depth + 1,
                id,
            };
            let child_ctx = Arc::clone(&ctx);
            // enlist the child before queueing it, so the scan wait group
            // cannot drain while children are still queued
            let child_wg = wg.clone();
            ctx.stats.queuing_workers.fetch_add(1, Ordering::Relaxed);
            rayon::spawn(move || scan_directory(job, child_ctx, child_wg));
        }
    }

    ctx.stats.active_workers.fetch_sub(1, Ordering::Relaxed);
    drop(wg);
}
