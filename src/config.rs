use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

/// Pending paths the result queue may hold before producers block.
pub const QUEUE_CAPACITY: usize = 1_000;
/// Largest number of paths delivered in a single batch.
pub const MAX_BATCH_SIZE: usize = 5_000;
/// Longest a partially filled batch waits before being flushed.
pub const BATCH_WINDOW: Duration = Duration::from_millis(200);
/// Quiet period after the last edit before a full search is dispatched.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(200);

/// Configuration for a scan session.
///
/// Defaults describe a whole-root index: hidden entries are included and
/// ignore files are not consulted, since the corpus is meant to cover
/// everything the process can read.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Include hidden files and directories.
    pub include_hidden: bool,
    /// Follow symbolic links during traversal.
    pub follow_symlinks: bool,
    /// Respect .ignore and .gitignore files found during the walk.
    pub respect_ignore_files: bool,
    /// Absolute paths pruned from every walk. Defaults cover the virtual
    /// filesystems that make a `/` crawl spin forever.
    pub pruned_paths: Vec<PathBuf>,
    /// Maximum directory traversal depth.
    pub max_depth: Option<usize>,
    /// Capacity of the bounded path queue between crawlers and the batcher.
    pub queue_capacity: usize,
    /// Upper bound on the size of one delivered batch.
    pub max_batch_size: usize,
    /// Time window a batch may accumulate before it is flushed.
    pub batch_window: Duration,
    /// Quiet period applied to successive queries before searching.
    pub debounce_window: Duration,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            include_hidden: true,
            follow_symlinks: false,
            respect_ignore_files: false,
            pruned_paths: vec![
                PathBuf::from("/proc"),
                PathBuf::from("/sys"),
                PathBuf::from("/dev"),
            ],
            max_depth: None,
            queue_capacity: QUEUE_CAPACITY,
            max_batch_size: MAX_BATCH_SIZE,
            batch_window: BATCH_WINDOW,
            debounce_window: DEBOUNCE_WINDOW,
        }
    }
}

impl ScanOptions {
    /// Build the set of pruned paths consulted by the walker filter.
    pub fn pruned_path_set(&self) -> HashSet<PathBuf> {
        self.pruned_paths.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_everything_readable() {
        let options = ScanOptions::default();
        assert!(options.include_hidden);
        assert!(!options.respect_ignore_files);
        assert_eq!(options.queue_capacity, QUEUE_CAPACITY);
    }

    #[test]
    fn pruned_path_set_contains_configured_paths() {
        let mut options = ScanOptions::default();
        options.pruned_paths = vec![PathBuf::from("/tmp/skip")];
        let set = options.pruned_path_set();
        assert!(set.contains(&PathBuf::from("/tmp/skip")));
        assert_eq!(set.len(), 1);
    }
}
