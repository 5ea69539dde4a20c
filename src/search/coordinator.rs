use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use super::{MatchResult, SearchEngine, SearchUpdate};
use crate::corpus::Corpus;

/// Commands understood by the coordinator worker.
enum Command {
    /// A new query text from the caller.
    Query { generation: u64, text: String },
    /// A freshly scanned batch to filter incrementally.
    Batch(Arc<[String]>),
    /// The scan finished; settle the active query over the full corpus.
    ScanDone,
    /// Stop the worker thread.
    Shutdown,
}

/// Caller-side handle to the coordinator worker.
///
/// Every submitted query bumps the shared generation counter before the
/// command is sent, which is what lets in-flight searches for older
/// generations detect that they have been superseded.
#[derive(Clone)]
pub struct CoordinatorHandle {
    tx: Sender<Command>,
    latest_generation: Arc<AtomicU64>,
}

impl CoordinatorHandle {
    /// Issue a new query, superseding any earlier one. Returns the
    /// generation assigned to it.
    pub fn submit_query(&self, text: String) -> u64 {
        let generation = self.latest_generation.fetch_add(1, Ordering::AcqRel) + 1;
        let _ = self.tx.send(Command::Query { generation, text });
        generation
    }

    pub(crate) fn notify_batch(&self, paths: Arc<[String]>) {
        let _ = self.tx.send(Command::Batch(paths));
    }

    pub(crate) fn notify_scan_done(&self) {
        let _ = self.tx.send(Command::ScanDone);
    }

    pub(crate) fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }
}

/// Launch the coordinator worker and return its handle plus the stream of
/// result updates.
pub(crate) fn spawn_coordinator(
    corpus: Arc<Corpus>,
    engine: SearchEngine,
    debounce_window: Duration,
) -> (CoordinatorHandle, Receiver<SearchUpdate>) {
    let (command_tx, command_rx) = mpsc::channel();
    let (update_tx, update_rx) = mpsc::channel();
    let latest_generation = Arc::new(AtomicU64::new(0));
    let worker_latest = Arc::clone(&latest_generation);

    thread::spawn(move || {
        let mut worker = Worker {
            corpus,
            engine,
            debounce_window,
            latest_generation: worker_latest,
            updates: update_tx,
            active: None,
            pending: None,
        };
        worker.run(command_rx);
    });

    (
        CoordinatorHandle {
            tx: command_tx,
            latest_generation,
        },
        update_rx,
    )
}

/// A query waiting out its debounce window.
struct Pending {
    generation: u64,
    text: String,
    deadline: Instant,
}

/// The query currently answered by the displayed result set.
struct Active {
    generation: u64,
    text: String,
    /// Paths currently displayed for this query; appends stop once the
    /// result cap is reached.
    shown: usize,
}

struct Worker {
    corpus: Arc<Corpus>,
    engine: SearchEngine,
    debounce_window: Duration,
    latest_generation: Arc<AtomicU64>,
    updates: Sender<SearchUpdate>,
    active: Option<Active>,
    pending: Option<Pending>,
}

impl Worker {
    fn run(&mut self, commands: Receiver<Command>) {
        loop {
            let command = match &self.pending {
                Some(pending) => {
                    let now = Instant::now();
                    if pending.deadline <= now {
                        None
                    } else {
                        match commands.recv_timeout(pending.deadline - now) {
                            Ok(command) => Some(command),
                            Err(RecvTimeoutError::Timeout) => None,
                            Err(RecvTimeoutError::Disconnected) => return,
                        }
                    }
                }
                None => match commands.recv() {
                    Ok(command) => Some(command),
                    Err(_) => return,
                },
            };

            match command {
                // Debounce window elapsed with no newer edit.
                None => {
                    if let Some(pending) = self.pending.take()
                        && !self.settle(pending.generation, &pending.text)
                    {
                        return;
                    }
                }
                Some(Command::Query { generation, text }) => {
                    if !self.handle_query(generation, text) {
                        return;
                    }
                }
                Some(Command::Batch(paths)) => {
                    if !self.filter_batch(&paths) {
                        return;
                    }
                }
                Some(Command::ScanDone) => {
                    // Settle the displayed query against the now-complete
                    // corpus, unless a newer edit is still debouncing (its
                    // own settle will cover the full corpus).
                    if self.pending.is_none()
                        && let Some(active) = &self.active
                    {
                        let (generation, text) = (active.generation, active.text.clone());
                        if !self.settle(generation, &text) {
                            return;
                        }
                    }
                }
                Some(Command::Shutdown) => return,
            }
        }
    }

    /// Record a new query and arm its debounce deadline. An empty text
    /// clears the active query immediately; there is nothing to debounce.
    fn handle_query(&mut self, generation: u64, text: String) -> bool {
        if text.is_empty() {
            self.active = None;
            self.pending = None;
            return self.send(SearchUpdate::Replace(MatchResult {
                generation,
                paths: Vec::new(),
                corpus_len: self.corpus.len(),
            }));
        }

        self.active = Some(Active {
            generation,
            text: text.clone(),
            shown: 0,
        });
        self.pending = Some(Pending {
            generation,
            text,
            deadline: Instant::now() + self.debounce_window,
        });
        true
    }

    /// Run one full engine pass if `generation` is still the latest. A
    /// stale pass is dropped silently: last write wins.
    fn settle(&mut self, generation: u64, text: &str) -> bool {
        let snapshot = self.corpus.snapshot();
        match self
            .engine
            .search(&snapshot, text, generation, &self.latest_generation)
        {
            Some(result) => {
                if let Some(active) = &mut self.active
                    && active.generation == generation
                {
                    active.shown = result.paths.len();
                }
                self.send(SearchUpdate::Replace(result))
            }
            None => true,
        }
    }

    /// Substring-filter one new batch against the active query and append
    /// any hits to the displayed set, up to the result cap. Appended
    /// matches are not re-ranked against a prior fuzzy-ordered result set.
    fn filter_batch(&mut self, paths: &Arc<[String]>) -> bool {
        let max_results = self.engine.max_results;
        let Some(active) = &mut self.active else {
            return true;
        };
        let remaining = max_results.saturating_sub(active.shown);
        if remaining == 0 {
            return true;
        }
        let needle = active.text.to_lowercase();
        let matched: Vec<String> = paths
            .iter()
            .filter(|path| path.to_lowercase().contains(&needle))
            .take(remaining)
            .cloned()
            .collect();
        if matched.is_empty() {
            return true;
        }
        active.shown += matched.len();
        let generation = active.generation;
        self.send(SearchUpdate::Append {
            generation,
            paths: matched,
        })
    }

    fn send(&self, update: SearchUpdate) -> bool {
        self.updates.send(update).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::TryRecvError;

    const DEBOUNCE: Duration = Duration::from_millis(50);

    fn corpus_of(paths: &[&str]) -> Arc<Corpus> {
        let corpus = Corpus::new();
        corpus.append(paths.iter().map(|p| (*p).to_string()).collect());
        Arc::new(corpus)
    }

    fn settle_and_drain(updates: &Receiver<SearchUpdate>) -> Vec<SearchUpdate> {
        thread::sleep(DEBOUNCE * 6);
        let mut received = Vec::new();
        loop {
            match updates.try_recv() {
                Ok(update) => received.push(update),
                Err(_) => break,
            }
        }
        received
    }

    #[test]
    fn rapid_edits_settle_into_one_search() {
        let corpus = corpus_of(&["src/abc.go", "test/abc_test.go", "README.md"]);
        let (handle, updates) = spawn_coordinator(corpus, SearchEngine::default(), DEBOUNCE);

        handle.submit_query("a".to_string());
        thread::sleep(DEBOUNCE / 4);
        handle.submit_query("ab".to_string());
        thread::sleep(DEBOUNCE / 4);
        let last = handle.submit_query("abc".to_string());

        let received = settle_and_drain(&updates);
        assert_eq!(received.len(), 1, "expected exactly one settled search");
        match &received[0] {
            SearchUpdate::Replace(result) => {
                assert_eq!(result.generation, last);
                assert_eq!(result.paths.len(), 2);
            }
            other => panic!("unexpected update: {other:?}"),
        }
        handle.shutdown();
    }

    #[test]
    fn empty_query_clears_results_immediately() {
        let corpus = corpus_of(&["src/abc.go"]);
        let (handle, updates) = spawn_coordinator(corpus, SearchEngine::default(), DEBOUNCE);

        let generation = handle.submit_query(String::new());
        let update = updates
            .recv_timeout(Duration::from_secs(1))
            .expect("clear update");
        match update {
            SearchUpdate::Replace(result) => {
                assert_eq!(result.generation, generation);
                assert!(result.paths.is_empty());
            }
            other => panic!("unexpected update: {other:?}"),
        }
        handle.shutdown();
    }

    #[test]
    fn new_batches_extend_active_results() {
        let corpus = corpus_of(&["src/abc.go"]);
        let (handle, updates) = spawn_coordinator(corpus, SearchEngine::default(), DEBOUNCE);

        let generation = handle.submit_query("abc".to_string());
        let settled = settle_and_drain(&updates);
        assert_eq!(settled.len(), 1);

        let batch: Arc<[String]> = ["new/abc_helper.rs".to_string(), "new/unrelated.rs".to_string()]
            .into_iter()
            .collect();
        handle.notify_batch(batch);

        let update = updates
            .recv_timeout(Duration::from_secs(1))
            .expect("append update");
        match update {
            SearchUpdate::Append { generation: g, paths } => {
                assert_eq!(g, generation);
                assert_eq!(paths, vec!["new/abc_helper.rs".to_string()]);
            }
            other => panic!("unexpected update: {other:?}"),
        }
        handle.shutdown();
    }

    #[test]
    fn appends_stop_at_the_result_cap() {
        let corpus = corpus_of(&["src/abc.go"]);
        let engine = SearchEngine {
            max_results: 2,
            ..SearchEngine::default()
        };
        let (handle, updates) = spawn_coordinator(corpus, engine, DEBOUNCE);

        handle.submit_query("abc".to_string());
        // The settled pass shows one match, leaving room for one append.
        let settled = settle_and_drain(&updates);
        assert_eq!(settled.len(), 1);

        let batch: Arc<[String]> = ["new/abc_one.rs".to_string(), "new/abc_two.rs".to_string()]
            .into_iter()
            .collect();
        handle.notify_batch(batch);
        match updates
            .recv_timeout(Duration::from_secs(1))
            .expect("capped append")
        {
            SearchUpdate::Append { paths, .. } => {
                assert_eq!(paths, vec!["new/abc_one.rs".to_string()]);
            }
            other => panic!("unexpected update: {other:?}"),
        }

        // Displayed set is full; further batches emit nothing.
        let batch: Arc<[String]> = ["late/abc_three.rs".to_string()].into_iter().collect();
        handle.notify_batch(batch);
        thread::sleep(DEBOUNCE);
        assert_eq!(updates.try_recv().unwrap_err(), TryRecvError::Empty);
        handle.shutdown();
    }

    #[test]
    fn batches_without_matches_emit_nothing() {
        let corpus = corpus_of(&["src/abc.go"]);
        let (handle, updates) = spawn_coordinator(corpus, SearchEngine::default(), DEBOUNCE);

        handle.submit_query("abc".to_string());
        settle_and_drain(&updates);

        let batch: Arc<[String]> = ["other/file.rs".to_string()].into_iter().collect();
        handle.notify_batch(batch);
        thread::sleep(DEBOUNCE);
        assert_eq!(updates.try_recv().unwrap_err(), TryRecvError::Empty);
        handle.shutdown();
    }

    #[test]
    fn batches_are_ignored_without_an_active_query() {
        let corpus = corpus_of(&["src/abc.go"]);
        let (handle, updates) = spawn_coordinator(corpus, SearchEngine::default(), DEBOUNCE);

        let batch: Arc<[String]> = ["src/other.rs".to_string()].into_iter().collect();
        handle.notify_batch(batch);
        thread::sleep(DEBOUNCE);
        assert_eq!(updates.try_recv().unwrap_err(), TryRecvError::Empty);
        handle.shutdown();
    }

    #[test]
    fn scan_done_settles_the_active_query_again() {
        let corpus = corpus_of(&["src/abc.go"]);
        let (handle, updates) = spawn_coordinator(Arc::clone(&corpus), SearchEngine::default(), DEBOUNCE);

        handle.submit_query("abc".to_string());
        settle_and_drain(&updates);

        // More paths arrive, then the scan finishes.
        corpus.append(["late/abc_extra.rs".to_string()].into_iter().collect());
        handle.notify_scan_done();

        let update = updates
            .recv_timeout(Duration::from_secs(1))
            .expect("final settle");
        match update {
            SearchUpdate::Replace(result) => {
                assert_eq!(result.corpus_len, 2);
                assert!(result.paths.iter().any(|p| p.contains("abc_extra")));
            }
            other => panic!("unexpected update: {other:?}"),
        }
        handle.shutdown();
    }
}
