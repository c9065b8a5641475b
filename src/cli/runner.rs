//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::SafeClientConfig;
use crate::retry::SafeClient;
use anyhow::{Context, Result};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;

        match &self.cli.command {
            Commands::Call { operation, args } => self.call(&config, operation, args).await,
            Commands::Config => self.show_config(&config),
        }
    }

    /// Load the config file and apply command-line overrides
    pub fn load_config(&self) -> Result<SafeClientConfig> {
        let mut config = SafeClientConfig::load(self.cli.config.as_deref())
            .context("Failed to load configuration")?;

        if let Some(max_tries) = self.cli.max_tries {
            config.max_tries = max_tries;
        }
        if let Some(limit) = self.cli.counter_limit {
            config.counter_limit = limit;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }

    async fn call(
        &self,
        config: &SafeClientConfig,
        operation: &str,
        args: &[String],
    ) -> Result<()> {
        let args = parse_args(args);
        let client = SafeClient::http(config).context("Failed to create client")?;

        let result = client.api(operation, args).await;
        client.shutdown();

        let value = result.with_context(|| format!("Call to '{operation}' failed"))?;
        self.output(&value)
    }

    fn show_config(&self, config: &SafeClientConfig) -> Result<()> {
        print!("{}", config.to_redacted_yaml()?);
        Ok(())
    }

    fn output(&self, value: &Value) -> Result<()> {
        let rendered = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{rendered}");
        Ok(())
    }
}

/// Parse `--args` values: JSON where possible, plain strings otherwise
pub fn parse_args(raw: &[String]) -> Vec<Value> {
    raw.iter()
        .map(|arg| serde_json::from_str(arg).unwrap_or_else(|_| Value::String(arg.clone())))
        .collect()
}

/// Log filter for the binary: `RUST_LOG` when set, otherwise `info` (`debug` when verbose)
pub fn log_filter(verbose: bool, rust_log: Option<&str>) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "info" };
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}
