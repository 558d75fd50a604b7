//! End-to-end indexing tests over temp-dir fixtures: scan scenarios, read-side
//! queries, worker-count invariance, and interrupt safety.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use tempfile::tempdir;
use treedex::engine::path_hash;
use treedex::{CatalogDb, CatalogOpts, FileIndexer, IndexError};

const FILE_BYTES: &[u8] = &[1, 2, 3, 4, 5];

fn build_tree(root: &Path, paths: &[&str]) {
    for p in paths {
        let full = root.join(p);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(&full, FILE_BYTES).unwrap();
    }
}

fn index_tree(root: &Path, db_path: &Path, workers: usize, batch: usize) -> Arc<CatalogDb> {
    let db = Arc::new(
        CatalogDb::open(
            db_path,
            CatalogOpts {
                reset: true,
                batch_size: batch,
            },
        )
        .unwrap(),
    );
    let indexer = FileIndexer::new(Arc::clone(&db), workers).unwrap();
    indexer.index_dir(root).unwrap();
    db
}

type Row = (i64, Option<i64>, String, i64, String, String, i64);

fn dump_rows(db_path: &Path) -> Vec<Row> {
    let conn = rusqlite::Connection::open(db_path).unwrap();
    let mut stmt = conn
        .prepare("SELECT id, parent_id, path, depth, name, type, size FROM tree ORDER BY id")
        .unwrap();
    let rows = stmt
        .query_map([], |r| {
            Ok((
                r.get(0)?,
                r.get(1)?,
                r.get(2)?,
                r.get(3)?,
                r.get(4)?,
                r.get(5)?,
                r.get(6)?,
            ))
        })
        .unwrap();
    rows.map(|r| r.unwrap()).collect()
}

#[test]
fn test_empty_directory() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("empty");
    fs::create_dir(&root).unwrap();
    let db_path = dir.path().join("test.db");

    let db = Arc::new(
        CatalogDb::open(
            &db_path,
            CatalogOpts {
                reset: true,
                batch_size: 100,
            },
        )
        .unwrap(),
    );
    let indexer = FileIndexer::new(Arc::clone(&db), 2).unwrap();
    indexer.index_dir(&root).unwrap();

    let stats = indexer.stats();
    assert_eq!(stats.n_files, 0);
    assert_eq!(stats.total_size, 0);
    assert_eq!(stats.insertions, 1); // the root row

    let rows = dump_rows(&db_path);
    assert_eq!(rows.len(), 1);
    let (id, parent_id, path, depth, name, kind, _size) = &rows[0];
    assert_eq!(*id, path_hash("").unwrap());
    assert_eq!(*parent_id, None);
    assert_eq!(path, "");
    assert_eq!(*depth, 0);
    assert_eq!(name, "");
    assert_eq!(kind, "d");
}

#[test]
fn test_flat_tree() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("flat");
    fs::create_dir(&root).unwrap();
    build_tree(&root, &["a", "b", "c"]);
    let db_path = dir.path().join("test.db");

    let db = Arc::new(
        CatalogDb::open(
            &db_path,
            CatalogOpts {
                reset: true,
                batch_size: 100,
            },
        )
        .unwrap(),
    );
    let indexer = FileIndexer::new(Arc::clone(&db), 2).unwrap();
    indexer.index_dir(&root).unwrap();

    let stats = indexer.stats();
    assert_eq!(stats.n_files, 3);
    assert_eq!(stats.total_size, 15);
    assert_eq!(stats.active_workers, 0);
    assert_eq!(stats.queuing_workers, 0);

    let rows = dump_rows(&db_path);
    assert_eq!(rows.len(), 4);
    let root_id = path_hash("").unwrap();
    for name in ["a", "b", "c"] {
        let id = path_hash(name).unwrap();
        let row = rows.iter().find(|r| r.0 == id).unwrap();
        assert_eq!(row.1, Some(root_id));
        assert_eq!(row.3, 1); // depth
        assert_eq!(row.4, name);
        assert_eq!(row.5, "f");
        assert_eq!(row.6, 5);
    }
}

#[test]
fn test_catalog_completeness() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    let paths = [
        ".git/hooks/commit-msg.sample",
        ".git/config",
        "index/tests/index_test.rs",
        "src/lib.rs",
        "src/engine/hashing.rs",
    ];
    build_tree(&root, &paths);
    let db_path = dir.path().join("test.db");
    let db = index_tree(&root, &db_path, 4, 100);

    for p in paths {
        let id = db.get_id(p).unwrap();
        assert_eq!(id, path_hash(p).unwrap(), "path {p}");
        let base = p.rsplit('/').next().unwrap();
        assert_eq!(db.get_name(id).unwrap(), base, "path {p}");
        assert_eq!(db.get_path(id).unwrap(), p, "path {p}");
    }

    // intermediate directories are entries too
    let id = db.get_id(".git/hooks").unwrap();
    assert_eq!(db.get_name(id).unwrap(), "hooks");
    assert_eq!(db.get_path(id).unwrap(), ".git/hooks");
}

#[test]
fn test_clean_equivalence() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    build_tree(&root, &[".git/hooks/commit-msg.sample"]);
    let db_path = dir.path().join("test.db");
    let db = index_tree(&root, &db_path, 2, 100);

    assert_eq!(
        db.get_id(".git/hooks/../hooks/commit-msg.sample").unwrap(),
        db.get_id(".git/hooks/commit-msg.sample").unwrap()
    );
}

#[test]
fn test_absolute_rebase() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    build_tree(&root, &["x/y"]);
    let db_path = dir.path().join("test.db");
    let db = index_tree(&root, &db_path, 2, 100);

    assert_eq!(db.get_value("root_input").unwrap(), root.to_string_lossy());
    let root_abs = db.get_value("root_abs").unwrap();
    let abs_query = format!("{}/x/y", root_abs);
    assert_eq!(db.get_id(&abs_query).unwrap(), db.get_id("x/y").unwrap());
}

#[test]
fn test_unicode_normalization() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    // on-disk names in NFD: "Hôtel" and "été" spelled with combining marks
    build_tree(&root, &["Ho\u{0302}tel/e\u{0301}te\u{0301}"]);
    let db_path = dir.path().join("test.db");
    let db = index_tree(&root, &db_path, 2, 100);

    let nfc = db.get_id("Hôtel/été").unwrap();
    let nfd = db.get_id("Ho\u{0302}tel/e\u{0301}te\u{0301}").unwrap();
    assert_eq!(nfc, nfd);
    // stored names come back in NFC
    assert_eq!(db.get_name(nfc).unwrap(), "été");
    assert_eq!(db.get_path(nfc).unwrap(), "Hôtel/été");
}

#[test]
fn test_parent_chain() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    build_tree(&root, &["a/b/c/d/e"]);
    let db_path = dir.path().join("test.db");
    let db = index_tree(&root, &db_path, 2, 100);

    let mut id = db.get_id("a/b/c/d/e").unwrap();
    for _ in 0..5 {
        id = db.get_parent_id(id).unwrap().unwrap();
    }
    assert_eq!(id, path_hash("").unwrap());
    assert_eq!(db.get_parent_id(id).unwrap(), None);
}

#[test]
fn test_get_id_unknown_path() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    build_tree(&root, &["x/y"]);
    let db_path = dir.path().join("test.db");
    let db = index_tree(&root, &db_path, 2, 100);

    assert!(matches!(
        db.get_id("no/such/path"),
        Err(IndexError::EntryNotFound { .. })
    ));
}

#[test]
fn test_index_dir_missing_root() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("test.db");
    let db = Arc::new(
        CatalogDb::open(
            &db_path,
            CatalogOpts {
                reset: true,
                batch_size: 100,
            },
        )
        .unwrap(),
    );
    let indexer = FileIndexer::new(db, 2).unwrap();
    let err = indexer.index_dir(&dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, IndexError::Filesystem { .. }));
}

#[test]
fn test_worker_invariance() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    let mut paths = Vec::new();
    for d in 0..6 {
        for f in 0..15 {
            paths.push(format!("dir{}/sub{}/file{}", d, d % 3, f));
        }
    }
    let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
    build_tree(&root, &refs);

    let mut dumps = Vec::new();
    for workers in [1, 2, 8] {
        let db_path = dir.path().join(format!("test_{workers}.db"));
        let db = index_tree(&root, &db_path, workers, 100);
        drop(db);
        dumps.push(dump_rows(&db_path));
    }
    assert_eq!(dumps[0], dumps[1]);
    assert_eq!(dumps[0], dumps[2]);
}

/// Interrupt mid-scan: the result is either a clean finish or an interrupt
/// error, and in both cases the stored rows are a causally-closed set (every
/// non-root row's parent is stored and is a directory).
#[test]
fn test_interrupt_mid_scan() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("tree");
    fs::create_dir(&root).unwrap();
    let mut paths = Vec::new();
    for d in 0..40 {
        for f in 0..50 {
            paths.push(format!("dir{}/file{}", d, f));
        }
    }
    let refs: Vec<&str> = paths.iter().map(String::as_str).collect();
    build_tree(&root, &refs);

    let db_path = dir.path().join("test.db");
    let db = Arc::new(
        CatalogDb::open(
            &db_path,
            CatalogOpts {
                reset: true,
                batch_size: 100,
            },
        )
        .unwrap(),
    );
    let indexer = Arc::new(FileIndexer::new(Arc::clone(&db), 2).unwrap());

    let scan_indexer = Arc::clone(&indexer);
    let root_clone = root.clone();
    let scan = thread::spawn(move || scan_indexer.index_dir(&root_clone));

    // interrupt as soon as at least one row went to the database
    let deadline = Instant::now() + Duration::from_secs(10);
    while indexer.stats().insertions == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(1));
    }
    indexer.interrupt();

    let result = scan.join().unwrap();
    if let Err(e) = &result {
        assert!(matches!(e, IndexError::Interrupted));
    }

    let rows = dump_rows(&db_path);
    let by_id: HashMap<i64, &Row> = rows.iter().map(|r| (r.0, r)).collect();
    for row in &rows {
        if let Some(parent) = row.1 {
            let parent_row = by_id
                .get(&parent)
                .unwrap_or_else(|| panic!("row {:012x} has no stored parent", row.0));
            assert_eq!(parent_row.5, "d");
        }
    }
}
