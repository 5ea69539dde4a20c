use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::Serialize;

/// Output formats supported by the command line utility.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

/// Crawl filesystem roots and search the discovered paths.
#[derive(Debug, Parser)]
#[command(name = "scour", version, about)]
pub struct CliArgs {
    /// Query to run against the indexed paths.
    pub query: Option<String>,

    /// Root to scan; may be repeated. Defaults to every detected
    /// drive/mount point.
    #[arg(long = "root", value_name = "PATH")]
    pub roots: Vec<PathBuf>,

    /// Skip hidden files and directories.
    #[arg(long)]
    pub no_hidden: bool,

    /// Follow symbolic links during traversal.
    #[arg(long)]
    pub follow: bool,

    /// Respect .gitignore and .ignore files.
    #[arg(long)]
    pub respect_ignores: bool,

    /// Maximum traversal depth.
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Output format for matches.
    #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
    pub output: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

pub fn parse_cli() -> CliArgs {
    CliArgs::parse()
}

/// Final report printed once the scan has settled.
#[derive(Debug, Serialize)]
pub struct SearchReport {
    pub query: Option<String>,
    pub indexed: usize,
    pub skipped_subtrees: usize,
    pub matches: Vec<String>,
}

pub fn print_plain(report: &SearchReport) {
    for path in &report.matches {
        println!("{path}");
    }
}

pub fn print_json(report: &SearchReport) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}
