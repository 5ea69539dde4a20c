//! Background scanning: per-root crawler threads feeding a bounded queue
//! drained by a single batching consumer.

mod batcher;
mod crawler;

pub(crate) use batcher::{Batcher, run_batcher};
pub(crate) use crawler::spawn_crawlers;

use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of one scan session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    NotStarted,
    Scanning,
    Complete,
}

/// Shared, atomically updated [`ScanState`].
#[derive(Debug, Default)]
pub(crate) struct ScanStateCell(AtomicU8);

const STATE_NOT_STARTED: u8 = 0;
const STATE_SCANNING: u8 = 1;
const STATE_COMPLETE: u8 = 2;

impl ScanStateCell {
    pub fn new() -> Arc<Self> {
        Arc::new(Self(AtomicU8::new(STATE_NOT_STARTED)))
    }

    pub fn get(&self) -> ScanState {
        match self.0.load(Ordering::Acquire) {
            STATE_SCANNING => ScanState::Scanning,
            STATE_COMPLETE => ScanState::Complete,
            _ => ScanState::NotStarted,
        }
    }

    pub fn set(&self, state: ScanState) {
        let raw = match state {
            ScanState::NotStarted => STATE_NOT_STARTED,
            ScanState::Scanning => STATE_SCANNING,
            ScanState::Complete => STATE_COMPLETE,
        };
        self.0.store(raw, Ordering::Release);
    }
}

/// One bounded group of discovered paths delivered by the batcher.
#[derive(Debug, Clone)]
pub struct PathBatch {
    /// Newly discovered paths, in drain order.
    pub paths: Arc<[String]>,
    /// Running total of paths indexed so far, batch included.
    pub indexed_total: usize,
}

/// Final accounting for a finished scan.
#[derive(Debug, Clone, Copy)]
pub struct ScanSummary {
    /// Total paths delivered to the corpus.
    pub indexed_total: usize,
    /// Subtrees skipped because of I/O errors.
    pub skipped_subtrees: usize,
}

/// Incremental progress streamed to the caller while a scan runs.
#[derive(Debug, Clone)]
pub enum ScanEvent {
    Batch(PathBatch),
    Complete(ScanSummary),
}
