//! Progress display for the CLI stats ticker.

use std::sync::{Arc, Mutex};

use kdam::{Animation, Bar};

// Progress bar type alias
pub type ProgressBar = Arc<Mutex<Bar>>;

/// Create a counter for unknown total (shows count without percentage).
pub fn create_counter(desc: &'static str) -> ProgressBar {
    Arc::new(Mutex::new(kdam::tqdm!(
        total = 0,
        desc = desc,
        animation = Animation::Classic,
        position = 0,
        unit = " files"
    )))
}

/// Update the counter if available.
/// Uses try_lock so a contended display never blocks the ticker.
pub fn update_progress(pb: &ProgressBar, n: usize) {
    use kdam::BarExt;
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.update(n);
    }
}

/// Force a refresh (e.g. so the counter shows "0 files" immediately).
pub fn refresh(pb: &ProgressBar) {
    use kdam::BarExt;
    if let Ok(mut pb) = pb.try_lock() {
        let _ = pb.refresh();
    }
}
