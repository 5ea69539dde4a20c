use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::SyncSender;
use std::thread::{self, JoinHandle};

use ignore::{Walk, WalkBuilder};

use crate::config::ScanOptions;

/// Spawn one crawler thread per root plus a barrier thread that joins them.
///
/// Every crawler sends each discovered path onto the shared bounded queue
/// with a blocking send: producers that outrun the batcher are throttled by
/// queue backpressure. Each crawler owns one clone of `tx`; the original is
/// dropped here, so the queue disconnects exactly once, when the last
/// crawler finishes. The returned handle completes once all crawlers have
/// been joined.
///
/// Subtrees that fail with an I/O error are skipped and counted in
/// `skipped`, never aborting the rest of the root. Setting `cancel` makes
/// every crawler wind down promptly; a crawler blocked on a full queue also
/// exits as soon as the consumer side is dropped.
pub(crate) fn spawn_crawlers(
    roots: Vec<PathBuf>,
    options: &ScanOptions,
    tx: SyncSender<String>,
    cancel: Arc<AtomicBool>,
    skipped: Arc<AtomicUsize>,
) -> JoinHandle<()> {
    let mut handles = Vec::with_capacity(roots.len());
    for root in roots {
        let walker = build_walk(&root, options);
        let sender = tx.clone();
        let cancel = Arc::clone(&cancel);
        let skipped = Arc::clone(&skipped);
        handles.push(thread::spawn(move || {
            crawl_root(&root, walker, &sender, &cancel, &skipped);
        }));
    }
    drop(tx);

    thread::spawn(move || {
        for handle in handles {
            let _ = handle.join();
        }
        log::debug!("all crawlers finished");
    })
}

fn crawl_root(
    root: &Path,
    walker: Walk,
    sender: &SyncSender<String>,
    cancel: &AtomicBool,
    skipped: &AtomicUsize,
) {
    for entry in walker {
        if cancel.load(Ordering::Relaxed) {
            log::debug!("crawler for {} cancelled", root.display());
            return;
        }
        match entry {
            Ok(entry) => {
                let path = entry.path().to_string_lossy().into_owned();
                if sender.send(path).is_err() {
                    // Consumer went away; nothing left to produce for.
                    return;
                }
            }
            Err(err) => {
                skipped.fetch_add(1, Ordering::Relaxed);
                log::debug!("skipping subtree under {}: {err}", root.display());
            }
        }
    }
}

/// Build a configured walker for the given root and options.
fn build_walk(root: &Path, options: &ScanOptions) -> Walk {
    let pruned = options.pruned_path_set();
    let mut walker = WalkBuilder::new(root);

    walker
        .hidden(!options.include_hidden)
        .follow_links(options.follow_symlinks)
        .git_ignore(options.respect_ignore_files)
        .git_global(options.respect_ignore_files)
        .git_exclude(options.respect_ignore_files)
        .ignore(options.respect_ignore_files)
        .parents(options.respect_ignore_files)
        .max_depth(options.max_depth);

    if !pruned.is_empty() {
        walker.filter_entry(move |entry| !pruned.contains(entry.path()));
    }

    walker.build()
}
