use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::thread::JoinHandle;

use thiserror::Error;

use crate::config::ScanOptions;
use crate::corpus::Corpus;
use crate::scan::{self, Batcher, ScanEvent, ScanState, ScanStateCell};
use crate::search::{self, CoordinatorHandle, SearchEngine, SearchUpdate};

/// Errors raised when setting up a scan session.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no scan roots were provided")]
    NoRoots,
}

/// One live scan session: owns the corpus, the scan state, the crawler and
/// batcher threads, and the query coordinator.
///
/// There are no process-wide globals; abandoning a session cancels its
/// background work, and a finished session cannot be restarted (create a new
/// one instead).
pub struct ScanSession {
    corpus: Arc<Corpus>,
    state: Arc<ScanStateCell>,
    cancel: Arc<AtomicBool>,
    skipped: Arc<AtomicUsize>,
    coordinator: CoordinatorHandle,
    updates: Receiver<SearchUpdate>,
    barrier: Option<JoinHandle<()>>,
    batcher: Option<JoinHandle<()>>,
}

impl ScanSession {
    /// Begin crawling `roots` concurrently, one crawler per root.
    ///
    /// Overlapping roots are collapsed to the outermost ones first, so a
    /// root nested under another never gets a second crawler and every
    /// entry lands in the corpus exactly once.
    ///
    /// Returns the session plus the stream of [`ScanEvent`]s the caller
    /// observes for incremental progress; the stream ends with
    /// [`ScanEvent::Complete`].
    pub fn start(
        roots: Vec<PathBuf>,
        options: ScanOptions,
    ) -> Result<(Self, Receiver<ScanEvent>), ScanError> {
        let roots = crate::roots::disjoint_roots(roots);
        if roots.is_empty() {
            return Err(ScanError::NoRoots);
        }

        let corpus = Arc::new(Corpus::new());
        let state = ScanStateCell::new();
        let cancel = Arc::new(AtomicBool::new(false));
        let skipped = Arc::new(AtomicUsize::new(0));

        let (coordinator, updates) = search::spawn_coordinator(
            Arc::clone(&corpus),
            SearchEngine::default(),
            options.debounce_window,
        );

        let (path_tx, path_rx) = mpsc::sync_channel(options.queue_capacity);
        let (event_tx, event_rx) = mpsc::channel();

        log::info!("starting scan across {} roots", roots.len());
        state.set(ScanState::Scanning);

        let barrier = scan::spawn_crawlers(
            roots,
            &options,
            path_tx,
            Arc::clone(&cancel),
            Arc::clone(&skipped),
        );
        let batcher = scan::run_batcher(Batcher {
            rx: path_rx,
            corpus: Arc::clone(&corpus),
            state: Arc::clone(&state),
            events: event_tx,
            coordinator: Some(coordinator.clone()),
            skipped: Arc::clone(&skipped),
            max_batch_size: options.max_batch_size,
            batch_window: options.batch_window,
        });

        let session = Self {
            corpus,
            state,
            cancel,
            skipped,
            coordinator,
            updates,
            barrier: Some(barrier),
            batcher: Some(batcher),
        };
        Ok((session, event_rx))
    }

    /// Issue a query for `text`, superseding any earlier query. Results
    /// arrive on [`ScanSession::updates`]; only the latest generation's
    /// result should be rendered.
    pub fn query(&self, text: &str) -> u64 {
        self.coordinator.submit_query(text.to_string())
    }

    /// Stream of search result updates.
    pub fn updates(&self) -> &Receiver<SearchUpdate> {
        &self.updates
    }

    /// Number of paths indexed so far; monotonically non-decreasing.
    pub fn corpus_len(&self) -> usize {
        self.corpus.len()
    }

    /// Subtrees skipped because of I/O errors, so far.
    pub fn skipped_subtrees(&self) -> usize {
        self.skipped.load(Ordering::Relaxed)
    }

    pub fn state(&self) -> ScanState {
        self.state.get()
    }

    /// Ask every crawler to wind down promptly. The scan still transitions
    /// to `Complete` once the queue drains.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    /// Block until the crawlers and the batcher have finished.
    pub fn wait(&mut self) {
        if let Some(barrier) = self.barrier.take() {
            let _ = barrier.join();
        }
        if let Some(batcher) = self.batcher.take() {
            let _ = batcher.join();
        }
    }
}

impl Drop for ScanSession {
    fn drop(&mut self) {
        self.cancel();
        self.coordinator.shutdown();
    }
}
