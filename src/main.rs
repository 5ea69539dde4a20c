mod cli;

use std::time::Duration;

use anyhow::{Context, Result, bail};
use cli::{CliArgs, OutputFormat, SearchReport, parse_cli, print_json, print_plain};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

use scour::{ScanEvent, ScanOptions, ScanSession, ScanSummary, SearchUpdate, enumerate_roots};

fn main() -> Result<()> {
    let args = parse_cli();
    init_logging(args.verbose)?;

    let roots = if args.roots.is_empty() {
        enumerate_roots()
    } else {
        args.roots.clone()
    };
    let options = build_options(&args);

    let report = run_scan(&args, roots, options)?;
    match args.output {
        OutputFormat::Plain => print_plain(&report),
        OutputFormat::Json => print_json(&report)?,
    }
    Ok(())
}

fn init_logging(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("initializing logger")
}

fn build_options(args: &CliArgs) -> ScanOptions {
    let mut options = ScanOptions::default();
    options.include_hidden = !args.no_hidden;
    options.follow_symlinks = args.follow;
    options.respect_ignore_files = args.respect_ignores;
    options.max_depth = args.max_depth;
    options
}

/// Scan to completion, then settle the query (if any) against the full
/// corpus.
fn run_scan(
    args: &CliArgs,
    roots: Vec<std::path::PathBuf>,
    options: ScanOptions,
) -> Result<SearchReport> {
    let query = args
        .query
        .as_deref()
        .filter(|text| !text.is_empty())
        .map(str::to_string);

    let (mut session, events) = ScanSession::start(roots, options).context("starting scan")?;
    if let Some(text) = &query {
        session.query(text);
    }

    let summary = drain_events(&events)?;
    session.wait();

    let matches = match &query {
        Some(_) => final_matches(&session, &summary)?,
        None => Vec::new(),
    };

    Ok(SearchReport {
        query,
        indexed: summary.indexed_total,
        skipped_subtrees: summary.skipped_subtrees,
        matches,
    })
}

fn drain_events(events: &std::sync::mpsc::Receiver<ScanEvent>) -> Result<ScanSummary> {
    loop {
        match events.recv() {
            Ok(ScanEvent::Batch(batch)) => {
                log::info!("indexing {} paths...", batch.indexed_total);
            }
            Ok(ScanEvent::Complete(summary)) => return Ok(summary),
            Err(_) => bail!("scan event stream ended unexpectedly"),
        }
    }
}

/// Wait for the result pass that covers the completed corpus. Earlier
/// partial results (debounced passes, incremental appends) are skipped.
fn final_matches(session: &ScanSession, summary: &ScanSummary) -> Result<Vec<String>> {
    let deadline = Duration::from_secs(5);
    loop {
        match session.updates().recv_timeout(deadline) {
            Ok(SearchUpdate::Replace(result)) if result.corpus_len == summary.indexed_total => {
                return Ok(result.paths);
            }
            Ok(_) => continue,
            Err(_) => bail!("timed out waiting for the final search pass"),
        }
    }
}
