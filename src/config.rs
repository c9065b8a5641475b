//! Client configuration
//!
//! [`SafeClientConfig`] holds everything fixed at construction time. It can
//! be built in code through [`SafeClientConfig::builder`] or loaded from a
//! YAML/JSON file whose keys follow the exchange wrapper's option names
//! (`maxTries`, `counterDecIntervalMs`, `counterLimit`, ...).

use crate::counter::CounterConfig;
use crate::error::{Error, Result};
use crate::transport::{Credentials, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Cost units charged per attempted call
pub const DEFAULT_CALL_COST: u64 = 2;

// ============================================================================
// Client Config
// ============================================================================

/// Configuration for a [`SafeClient`](crate::SafeClient)
#[derive(Debug, Clone, PartialEq)]
pub struct SafeClientConfig {
    /// Credentials forwarded to the transport
    pub credentials: Credentials,
    /// Maximum attempts per call (including the first)
    pub max_tries: u32,
    /// Cost counter decrement period
    pub counter_dec_interval: Duration,
    /// Admission ceiling: calls wait until the budget is at or below it
    pub counter_limit: u64,
    /// Units charged per attempt
    pub call_cost: u64,
    /// Units drained per decrement tick
    pub counter_dec_step: u64,
    /// Exchange API base URL
    pub base_url: String,
    /// Per-request timeout enforced by the HTTP transport
    pub timeout: Duration,
}

impl Default for SafeClientConfig {
    fn default() -> Self {
        Self {
            credentials: Credentials::default(),
            max_tries: 1,
            counter_dec_interval: Duration::from_millis(3000),
            counter_limit: 10,
            call_cost: DEFAULT_CALL_COST,
            counter_dec_step: 1,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl SafeClientConfig {
    /// Create a new config builder
    pub fn builder() -> SafeClientConfigBuilder {
        SafeClientConfigBuilder::default()
    }

    /// Parse a YAML (or JSON) config document
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(content)?;
        Ok(file.into_config())
    }

    /// Load a config file from disk
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Load an optional config file, then fill missing credentials from the
    /// environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if config.credentials.is_empty() {
            if let Some(credentials) = Credentials::from_env() {
                config.credentials = credentials;
            }
        }

        Ok(config)
    }

    /// Check the values the client relies on
    pub fn validate(&self) -> Result<()> {
        if self.max_tries == 0 {
            return Err(Error::invalid_value("maxTries", "must be at least 1"));
        }
        if self.counter_dec_interval.is_zero() {
            return Err(Error::invalid_value(
                "counterDecIntervalMs",
                "must be greater than zero",
            ));
        }
        if self.counter_dec_step == 0 {
            return Err(Error::invalid_value(
                "counterDecStep",
                "must be greater than zero",
            ));
        }
        if self.base_url.is_empty() {
            return Err(Error::missing_field("baseUrl"));
        }
        Ok(())
    }

    /// Decrement schedule for the cost counter
    pub fn counter_config(&self) -> CounterConfig {
        CounterConfig::new(self.counter_dec_interval, self.counter_dec_step)
    }

    /// Render the config as YAML with the secret masked
    pub fn to_redacted_yaml(&self) -> Result<String> {
        let mut file = ConfigFile::from(self);
        if file.secret.as_deref().is_some_and(|s| !s.is_empty()) {
            file.secret = Some("***".to_string());
        }
        Ok(serde_yaml::to_string(&file)?)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for the client config
#[derive(Default)]
pub struct SafeClientConfigBuilder {
    config: SafeClientConfig,
}

impl SafeClientConfigBuilder {
    /// Set API credentials
    pub fn credentials(mut self, key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.config.credentials = Credentials::new(key, secret);
        self
    }

    /// Set max attempts per call
    pub fn max_tries(mut self, tries: u32) -> Self {
        self.config.max_tries = tries;
        self
    }

    /// Set the cost counter decrement period
    pub fn counter_dec_interval(mut self, interval: Duration) -> Self {
        self.config.counter_dec_interval = interval;
        self
    }

    /// Set the admission ceiling
    pub fn counter_limit(mut self, limit: u64) -> Self {
        self.config.counter_limit = limit;
        self
    }

    /// Set the cost charged per attempt
    pub fn call_cost(mut self, cost: u64) -> Self {
        self.config.call_cost = cost;
        self
    }

    /// Set the units drained per tick
    pub fn counter_dec_step(mut self, step: u64) -> Self {
        self.config.counter_dec_step = step;
        self
    }

    /// Set the API base URL
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    /// Set the HTTP request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the config
    pub fn build(self) -> SafeClientConfig {
        self.config
    }
}

// ============================================================================
// File Format
// ============================================================================

/// On-disk representation; every key is optional and falls back to the
/// default
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    secret: Option<String>,
    #[serde(default)]
    max_tries: Option<u32>,
    #[serde(default)]
    counter_dec_interval_ms: Option<u64>,
    #[serde(default)]
    counter_limit: Option<u64>,
    #[serde(default)]
    call_cost: Option<u64>,
    #[serde(default)]
    counter_dec_step: Option<u64>,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    timeout_ms: Option<u64>,
}

impl ConfigFile {
    fn into_config(self) -> SafeClientConfig {
        let defaults = SafeClientConfig::default();

        let credentials = match self.key {
            Some(key) => Credentials::new(key, self.secret.unwrap_or_default()),
            None => defaults.credentials,
        };

        SafeClientConfig {
            credentials,
            max_tries: self.max_tries.unwrap_or(defaults.max_tries),
            counter_dec_interval: self
                .counter_dec_interval_ms
                .map_or(defaults.counter_dec_interval, Duration::from_millis),
            counter_limit: self.counter_limit.unwrap_or(defaults.counter_limit),
            call_cost: self.call_cost.unwrap_or(defaults.call_cost),
            counter_dec_step: self.counter_dec_step.unwrap_or(defaults.counter_dec_step),
            base_url: self.base_url.unwrap_or(defaults.base_url),
            timeout: self.timeout_ms.map_or(defaults.timeout, Duration::from_millis),
        }
    }
}

impl From<&SafeClientConfig> for ConfigFile {
    fn from(config: &SafeClientConfig) -> Self {
        let has_key = !config.credentials.is_empty();
        Self {
            key: has_key.then(|| config.credentials.key().to_string()),
            secret: has_key.then(|| config.credentials.secret().to_string()),
            max_tries: Some(config.max_tries),
            counter_dec_interval_ms: Some(config.counter_dec_interval.as_millis() as u64),
            counter_limit: Some(config.counter_limit),
            call_cost: Some(config.call_cost),
            counter_dec_step: Some(config.counter_dec_step),
            base_url: Some(config.base_url.clone()),
            timeout_ms: Some(config.timeout.as_millis() as u64),
        }
    }
}
