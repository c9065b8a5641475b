//! Transport seam types
//!
//! The core never looks inside call arguments or credentials: it forwards
//! them to whatever [`Transport`] was supplied and only inspects the shape
//! of the failures coming back.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Error category reported for failures raised while issuing a request
pub const REQUEST_ERROR: &str = "RequestError";

/// Error category reported when a response body could not be decoded
pub const PARSE_ERROR: &str = "ParseError";

/// Request timed out
pub const ETIMEDOUT: &str = "ETIMEDOUT";

/// Connection could not be established
pub const ECONNREFUSED: &str = "ECONNREFUSED";

/// Any other request-level failure
pub const EREQUEST: &str = "EREQUEST";

/// Response body was not the expected JSON envelope
pub const EPARSE: &str = "EPARSE";

// ============================================================================
// Transport Errors
// ============================================================================

/// A failure produced by a single transport call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The server answered with a non-success status
    #[error("HTTP {status_code}: {body}")]
    Status { status_code: u16, body: String },

    /// The request failed before a usable response arrived
    #[error("{name} ({code}): {message}")]
    Request {
        name: String,
        code: String,
        message: String,
    },

    /// The API answered with a non-empty error list
    #[error("{}", .errors.join(", "))]
    Api { errors: Vec<String> },

    /// A bare failure message without any structured fields
    #[error("{0}")]
    Message(String),
}

impl TransportError {
    /// Create a status error
    pub fn status(status_code: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status_code,
            body: body.into(),
        }
    }

    /// Create a request-level error
    pub fn request(
        name: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Request {
            name: name.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a request timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::request(REQUEST_ERROR, ETIMEDOUT, message)
    }

    /// Create an API error from the exchange's error list
    pub fn api(errors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Api {
            errors: errors.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an unstructured error
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Whether this failure carries any fields beyond a message
    pub fn is_structured(&self) -> bool {
        !matches!(self, TransportError::Message(_))
    }

    /// HTTP status code, if the failure has one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            TransportError::Status { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Error category name, if the failure has one
    pub fn name(&self) -> Option<&str> {
        match self {
            TransportError::Request { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Error code, if the failure has one
    pub fn code(&self) -> Option<&str> {
        match self {
            TransportError::Request { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if let Some(status) = e.status() {
            return Self::status(status.as_u16(), e.to_string());
        }

        let (name, code) = if e.is_timeout() {
            (REQUEST_ERROR, ETIMEDOUT)
        } else if e.is_connect() {
            (REQUEST_ERROR, ECONNREFUSED)
        } else if e.is_decode() {
            (PARSE_ERROR, EPARSE)
        } else {
            (REQUEST_ERROR, EREQUEST)
        };
        Self::request(name, code, e.to_string())
    }
}

// ============================================================================
// Call Invocation
// ============================================================================

/// An operation name plus its ordered, untouched argument list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CallInvocation {
    operation: String,
    args: Vec<Value>,
}

impl CallInvocation {
    /// Create a new invocation
    pub fn new(operation: impl Into<String>, args: Vec<Value>) -> Self {
        Self {
            operation: operation.into(),
            args,
        }
    }

    /// Operation name (e.g. "Balance", "AddOrder")
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Arguments forwarded after the operation name
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// JSON array of the operation name followed by its arguments
    pub fn describe(&self) -> String {
        let mut call = Vec::with_capacity(self.args.len() + 1);
        call.push(Value::String(self.operation.clone()));
        call.extend(self.args.iter().cloned());
        Value::Array(call).to_string()
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "KRAKEN_API_KEY";

/// Environment variable holding the API secret
pub const API_SECRET_ENV: &str = "KRAKEN_API_SECRET";

/// Opaque API credentials handed to the transport
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    key: String,
    secret: String,
}

impl Credentials {
    /// Create credentials from a key and secret
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
        }
    }

    /// Read credentials from `KRAKEN_API_KEY` / `KRAKEN_API_SECRET`
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read credentials through an arbitrary variable lookup.
    ///
    /// A key without a secret is rejected with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let key = lookup(API_KEY_ENV)?;
        let Some(secret) = lookup(API_SECRET_ENV).filter(|secret| !secret.is_empty()) else {
            warn!("{API_KEY_ENV} is set but {API_SECRET_ENV} is missing, ignoring credentials");
            return None;
        };
        Some(Self::new(key, secret))
    }

    /// API key
    pub fn key(&self) -> &str {
        &self.key
    }

    /// API secret
    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// Whether no key has been configured
    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

// ============================================================================
// Transport Trait
// ============================================================================

/// The underlying exchange API client
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one call and return its result or failure
    async fn call(&self, operation: &str, args: &[Value]) -> Result<Value, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn call(&self, operation: &str, args: &[Value]) -> Result<Value, TransportError> {
        (**self).call(operation, args).await
    }
}
