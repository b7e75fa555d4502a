//! tally: categorize a bank statement locally and write an anonymized report.
//!
//! Usage:
//!   tally statement.csv                       rules only
//!   tally statement.csv --ai --web-search     ask the local classifier too
//!   tally statement.csv -o - | jq .summary    JSON to stdout

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod afm_cli;
mod config;
mod output;
mod pipeline;
mod remote_categories;
mod state;
mod summary;
mod web_search;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TALLY_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(name = "tally", version = VERSION, about = "Categorize bank statements into an anonymized spending report")]
pub struct Cli {
    /// Statement CSV (Amex, CommBank or Pocketbook export)
    pub file: PathBuf,

    /// Skip header detection: amex, commbank or pocketbook
    #[arg(short, long)]
    pub format: Option<String>,

    /// JSON report path; `-` for stdout (default: <FILE stem>.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Categories JSON with vocabulary, rules and default category
    #[arg(short, long)]
    pub categories: Option<PathBuf>,

    /// Also write <FILE stem>.import.csv with the expenses
    #[arg(long)]
    pub csv: bool,

    /// Classify unmatched merchants with the local completion command
    #[arg(long)]
    pub ai: bool,

    /// Model passed to the completion command
    #[arg(long)]
    pub model: Option<String>,

    /// Retry still-unknown merchants with web search snippets (needs --ai)
    #[arg(long)]
    pub web_search: bool,

    /// Load the category list from the budgeting server
    #[arg(long)]
    pub fetch_categories: bool,

    /// Category server URL (overrides config)
    #[arg(long)]
    pub server: Option<String>,

    /// Keep Transfer and Income rows in the report
    #[arg(long)]
    pub keep_transfers: bool,

    /// Config file (default: ~/.tally/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG > --verbose > info
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    pipeline::run(&cli).await
}
