use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

/// Append-only accumulation of every path discovered during a session.
///
/// Paths arrive as immutable segments, one per delivered batch, so readers
/// never contend with the writer over entry storage: a snapshot clones the
/// segment list (cheap `Arc` bumps) and is immune to later appends. The
/// batcher is the only writer; searches may read concurrently.
#[derive(Default)]
pub struct Corpus {
    segments: RwLock<Vec<Arc<[String]>>>,
    len: AtomicUsize,
}

impl Corpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one batch as a new immutable segment.
    ///
    /// Entries are never removed or reordered afterwards, which keeps the
    /// corpus length monotonically non-decreasing for the session.
    pub fn append(&self, segment: Arc<[String]>) {
        if segment.is_empty() {
            return;
        }
        let mut segments = match self.segments.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let added = segment.len();
        segments.push(segment);
        self.len.fetch_add(added, Ordering::Release);
    }

    /// Number of paths accumulated so far.
    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Capture a point-in-time view of the corpus.
    pub fn snapshot(&self) -> CorpusSnapshot {
        let segments = match self.segments.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let segments: Vec<Arc<[String]>> = segments.clone();
        let len = segments.iter().map(|segment| segment.len()).sum();
        CorpusSnapshot { segments, len }
    }
}

/// Immutable view of the corpus taken at a single instant.
#[derive(Clone)]
pub struct CorpusSnapshot {
    segments: Vec<Arc<[String]>>,
    len: usize,
}

impl CorpusSnapshot {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate all paths in corpus order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .flat_map(|segment| segment.iter().map(String::as_str))
    }

    /// The underlying segments, in append order.
    pub fn segments(&self) -> &[Arc<[String]>] {
        &self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(paths: &[&str]) -> Arc<[String]> {
        paths.iter().map(|p| (*p).to_string()).collect()
    }

    #[test]
    fn append_grows_monotonically() {
        let corpus = Corpus::new();
        assert_eq!(corpus.len(), 0);
        corpus.append(segment(&["a", "b"]));
        assert_eq!(corpus.len(), 2);
        corpus.append(segment(&["c"]));
        assert_eq!(corpus.len(), 3);
    }

    #[test]
    fn empty_segments_are_dropped() {
        let corpus = Corpus::new();
        corpus.append(segment(&[]));
        assert!(corpus.is_empty());
        assert!(corpus.snapshot().segments().is_empty());
    }

    #[test]
    fn snapshot_preserves_append_order() {
        let corpus = Corpus::new();
        corpus.append(segment(&["one", "two"]));
        corpus.append(segment(&["three"]));
        let snapshot = corpus.snapshot();
        let paths: Vec<&str> = snapshot.iter().collect();
        assert_eq!(paths, vec!["one", "two", "three"]);
    }

    #[test]
    fn snapshot_is_immune_to_later_appends() {
        let corpus = Corpus::new();
        corpus.append(segment(&["before"]));
        let snapshot = corpus.snapshot();
        corpus.append(segment(&["after"]));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.iter().count(), 1);
        assert_eq!(corpus.len(), 2);
    }
}
