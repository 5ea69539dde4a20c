use std::sync::atomic::{AtomicU64, Ordering};

use frizbee::Config;

use super::{FUZZY_CORPUS_LIMIT, MATCH_CHUNK_SIZE, MAX_RESULTS, MatchResult};
use crate::corpus::CorpusSnapshot;

/// Stateless, re-entrant search pass over a corpus snapshot.
///
/// Algorithm selection is adaptive on corpus size: small corpora get ranked
/// fuzzy subsequence matching, large ones degrade to an unranked
/// case-insensitive substring scan whose cost does not scale with query
/// length. Both paths truncate at `max_results`.
#[derive(Debug, Clone, Copy)]
pub struct SearchEngine {
    /// Corpus sizes above this take the substring path.
    pub fuzzy_corpus_limit: usize,
    /// Cap on returned matches.
    pub max_results: usize,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self {
            fuzzy_corpus_limit: FUZZY_CORPUS_LIMIT,
            max_results: MAX_RESULTS,
        }
    }
}

impl SearchEngine {
    /// Run one full pass for `query` against `snapshot`.
    ///
    /// `latest_generation` is consulted between fuzzy chunks; if a newer
    /// query has been issued the pass aborts and returns `None`. The
    /// snapshot is immune to concurrent corpus appends, so this is safe to
    /// call while a scan is still running.
    pub fn search(
        &self,
        snapshot: &CorpusSnapshot,
        query: &str,
        generation: u64,
        latest_generation: &AtomicU64,
    ) -> Option<MatchResult> {
        let trimmed = query.trim();
        if is_stale(generation, latest_generation) {
            return None;
        }

        let paths = if trimmed.is_empty() {
            Vec::new()
        } else if snapshot.len() > self.fuzzy_corpus_limit {
            self.substring_scan(snapshot, trimmed)
        } else {
            self.fuzzy_scan(snapshot, trimmed, generation, latest_generation)?
        };

        Some(MatchResult {
            generation,
            paths,
            corpus_len: snapshot.len(),
        })
    }

    /// Linear case-insensitive containment scan, corpus order preserved.
    fn substring_scan(&self, snapshot: &CorpusSnapshot, query: &str) -> Vec<String> {
        let needle = query.to_lowercase();
        let mut matches = Vec::new();
        for path in snapshot.iter() {
            if matches.len() >= self.max_results {
                break;
            }
            if path.to_lowercase().contains(&needle) {
                matches.push(path.to_string());
            }
        }
        matches
    }

    /// Ranked subsequence matching in chunks, aborting once superseded.
    fn fuzzy_scan(
        &self,
        snapshot: &CorpusSnapshot,
        query: &str,
        generation: u64,
        latest_generation: &AtomicU64,
    ) -> Option<Vec<String>> {
        let paths: Vec<&str> = snapshot.iter().collect();
        let config = match_options();
        let mut scored: Vec<(u16, usize)> = Vec::new();

        for (chunk_index, chunk) in paths.chunks(MATCH_CHUNK_SIZE).enumerate() {
            if is_stale(generation, latest_generation) {
                return None;
            }
            let base = chunk_index * MATCH_CHUNK_SIZE;
            for entry in frizbee::match_list(query, chunk, &config) {
                if entry.score == 0 {
                    continue;
                }
                scored.push((entry.score, base + entry.index as usize));
            }
        }

        if is_stale(generation, latest_generation) {
            return None;
        }

        // Best score first; ties keep corpus order.
        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.truncate(self.max_results);
        Some(
            scored
                .into_iter()
                .map(|(_, index)| paths[index].to_string())
                .collect(),
        )
    }
}

/// Fuzzy options: the prefilter with a zero typo budget restricts matches to
/// true subsequences of the query, ranked by score.
fn match_options() -> Config {
    Config {
        max_typos: Some(0),
        sort: false,
        ..Config::default()
    }
}

fn is_stale(generation: u64, latest_generation: &AtomicU64) -> bool {
    latest_generation.load(Ordering::Acquire) != generation
}
