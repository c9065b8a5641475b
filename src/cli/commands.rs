//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Rate-budgeted, retrying Kraken API client
#[derive(Parser, Debug)]
#[command(name = "kraken-safe")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML or JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the maximum attempts per call
    #[arg(long, global = true)]
    pub max_tries: Option<u32>,

    /// Override the admission ceiling of the cost counter
    #[arg(long, global = true)]
    pub counter_limit: Option<u64>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output (enables per-call debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Call an API operation
    Call {
        /// Operation name (e.g. Time, Ticker, Balance)
        operation: String,

        /// Argument forwarded to the operation (JSON; repeatable)
        #[arg(long = "args")]
        args: Vec<String>,
    },

    /// Show the effective configuration (secret masked)
    Config,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON on a single line
    Json,
    /// Indented JSON
    Pretty,
}
