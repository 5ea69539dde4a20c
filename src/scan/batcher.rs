use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{PathBatch, ScanEvent, ScanState, ScanStateCell, ScanSummary};
use crate::corpus::Corpus;
use crate::search::CoordinatorHandle;

/// Sole consumer of the crawler queue.
///
/// Drains discovered paths into time- and size-bounded batches: block for
/// the first item, then opportunistically collect until the batch is full or
/// the window elapses, whichever comes first. The window bounds the
/// worst-case delay before a discovered path is visible downstream, while
/// full batches amortize per-batch processing during steady scanning.
pub(crate) struct Batcher {
    pub rx: Receiver<String>,
    pub corpus: Arc<Corpus>,
    pub state: Arc<ScanStateCell>,
    pub events: Sender<ScanEvent>,
    pub coordinator: Option<CoordinatorHandle>,
    pub skipped: Arc<AtomicUsize>,
    pub max_batch_size: usize,
    pub batch_window: Duration,
}

pub(crate) fn run_batcher(batcher: Batcher) -> JoinHandle<()> {
    thread::spawn(move || batcher.run())
}

impl Batcher {
    fn run(self) {
        loop {
            let first = match self.rx.recv() {
                Ok(path) => path,
                // Queue closed: every crawler has finished.
                Err(_) => break,
            };

            let mut batch = Vec::with_capacity(64);
            batch.push(first);
            let deadline = Instant::now() + self.batch_window;
            let mut closed = false;

            while batch.len() < self.max_batch_size {
                let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                    break;
                };
                match self.rx.recv_timeout(remaining) {
                    Ok(path) => batch.push(path),
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => {
                        closed = true;
                        break;
                    }
                }
            }

            self.deliver(batch);
            if closed {
                break;
            }
        }

        self.finish();
    }

    /// Append one batch to the corpus and fan it out to the caller's event
    /// stream and the query coordinator.
    fn deliver(&self, batch: Vec<String>) {
        let segment: Arc<[String]> = batch.into();
        self.corpus.append(Arc::clone(&segment));
        let indexed_total = self.corpus.len();
        log::trace!("batch of {} paths, {} indexed", segment.len(), indexed_total);

        let _ = self.events.send(ScanEvent::Batch(PathBatch {
            paths: Arc::clone(&segment),
            indexed_total,
        }));
        if let Some(coordinator) = &self.coordinator {
            coordinator.notify_batch(segment);
        }
    }

    fn finish(&self) {
        self.state.set(ScanState::Complete);
        let summary = ScanSummary {
            indexed_total: self.corpus.len(),
            skipped_subtrees: self.skipped.load(Ordering::Relaxed),
        };
        log::info!(
            "scan complete: {} paths indexed, {} subtrees skipped",
            summary.indexed_total,
            summary.skipped_subtrees
        );
        let _ = self.events.send(ScanEvent::Complete(summary));
        if let Some(coordinator) = &self.coordinator {
            coordinator.notify_scan_done();
        }
    }
}
