//! Error types for the safe Kraken client
//!
//! Every public API returns `Result<T, Error>`. Failures produced by the
//! remote call itself are [`TransportError`]s; the retry loop either
//! recovers from them or surfaces them wrapped in [`Error::Rethrow`].

use crate::transport::{CallInvocation, TransportError};
use thiserror::Error;

/// The main error type for the safe Kraken client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Call Errors
    // ============================================================================
    /// A non-retriable failure, wrapped with a reference to the original
    #[error("Rethrowing the \"{message}\" error")]
    Rethrow {
        message: String,
        #[source]
        original: TransportError,
    },

    /// Every permitted attempt failed with a retriable error
    #[error("kraken api call {call} failed after {attempts} tries")]
    Exhausted {
        operation: String,
        call: String,
        attempts: u32,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Client Construction Errors
    // ============================================================================
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Wrap a fatal transport failure, keeping its message and the original value
    pub fn rethrow(original: TransportError) -> Self {
        Self::Rethrow {
            message: original.to_string(),
            original,
        }
    }

    /// Create an attempt exhaustion error for an invocation
    pub fn exhausted(invocation: &CallInvocation, attempts: u32) -> Self {
        Self::Exhausted {
            operation: invocation.operation().to_string(),
            call: invocation.describe(),
            attempts,
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// The transport failure behind a rethrown error
    pub fn original(&self) -> Option<&TransportError> {
        match self {
            Error::Rethrow { original, .. } => Some(original),
            _ => None,
        }
    }

    /// Number of attempts made before giving up
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Error::Exhausted { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }

    /// Check if this error surfaced a fatal transport failure
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Rethrow { .. })
    }

    /// Check if this error reports attempt exhaustion
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Error::Exhausted { .. })
    }
}

/// Result type alias for the safe Kraken client
pub type Result<T> = std::result::Result<T, Error>;
