//! Live multi-root file search engine.
//!
//! A [`session::ScanSession`] crawls every configured filesystem root on
//! background threads, streaming discovered paths through a bounded queue
//! into an append-only [`corpus::Corpus`]. Queries can be issued while the
//! scan is still running: the coordinator debounces rapid edits, answers
//! settled input with a full adaptive search pass (fuzzy on small corpora,
//! substring on large ones), and extends live results with matches from
//! newly scanned batches.

pub mod config;
pub mod corpus;
pub mod roots;
pub mod scan;
pub mod search;
pub mod session;

pub use config::ScanOptions;
pub use corpus::{Corpus, CorpusSnapshot};
pub use roots::enumerate_roots;
pub use scan::{PathBatch, ScanEvent, ScanState, ScanSummary};
pub use search::{FUZZY_CORPUS_LIMIT, MAX_RESULTS, MatchResult, SearchEngine, SearchUpdate};
pub use session::{ScanError, ScanSession};
