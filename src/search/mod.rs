//! Query answering: a stateless adaptive engine plus a coordinator thread
//! that debounces keystrokes and filters freshly scanned batches.

mod coordinator;
mod engine;

pub use coordinator::CoordinatorHandle;
pub(crate) use coordinator::spawn_coordinator;
pub use engine::SearchEngine;

/// Result cap: everything past this many matches is truncated.
pub const MAX_RESULTS: usize = 1_000;

/// Corpus sizes above this use the cheap substring scan instead of ranked
/// fuzzy matching. The source behavior was ambiguous between two values;
/// this single knob is the resolved one (see DESIGN.md).
pub const FUZZY_CORPUS_LIMIT: usize = 20_000;

/// Paths scored per fuzzy chunk between staleness checks.
pub(crate) const MATCH_CHUNK_SIZE: usize = 512;

/// Matches answering one query generation, best first on the fuzzy path and
/// in corpus order on the substring path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Generation of the query this result answers.
    pub generation: u64,
    /// Matched paths, truncated to the result cap.
    pub paths: Vec<String>,
    /// Corpus size the search ran against.
    pub corpus_len: usize,
}

/// Updates streamed to the caller's result view.
///
/// `Append` carries substring matches from newly scanned batches while a
/// query is active, stopping once the displayed set reaches the result
/// cap. Appends are deliberately not re-ranked against an earlier
/// fuzzy-ordered `Replace` set; the ordering inconsistency is an accepted
/// trade-off for keeping per-batch work cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchUpdate {
    /// A settled full-corpus pass; replaces the displayed result set.
    Replace(MatchResult),
    /// Matches from one new batch; extends the displayed result set.
    Append { generation: u64, paths: Vec<String> },
}
