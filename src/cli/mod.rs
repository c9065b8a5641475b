//! CLI module
//!
//! Command-line interface for calling the exchange through the safe client.
//!
//! # Commands
//!
//! - `call` - Call an API operation with optional JSON arguments
//! - `config` - Print the effective configuration

mod commands;
mod runner;

pub use commands::{Cli, Commands, OutputFormat};
pub use runner::{log_filter, parse_args, Runner};
