//! Rate-budgeted, retrying exchange client
//!
//! Each call walks a small state machine:
//!
//! ```text
//! ATTEMPTING ─ok──────────────────────────────▶ SUCCESS
//!     │  └─retriable, attempts left─▶ ATTEMPTING
//!     ├─retriable, no attempts left──────────▶ EXHAUSTED
//!     └─fatal────────────────────────────────▶ FATAL
//! ```
//!
//! There is no deadline: a call ends after at most `max_tries` attempts, and
//! an in-flight transport call only ends through the transport's own
//! timeout.

use super::classify::{classify, Classification};
use super::gate::CallGate;
use crate::config::SafeClientConfig;
use crate::counter::CostCounter;
use crate::error::{Error, Result};
use crate::transport::{CallInvocation, HttpTransport, Transport};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Exchange client with admission control and bounded retries
pub struct SafeClient<T> {
    gate: CallGate<T>,
    max_tries: u32,
}

impl SafeClient<HttpTransport> {
    /// Create a client talking HTTP to the configured base URL.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn http(config: &SafeClientConfig) -> Result<Self> {
        config.validate()?;
        let transport =
            HttpTransport::new(&config.base_url, config.credentials.clone(), config.timeout)?;
        Ok(Self::new(config, transport))
    }
}

impl<T: Transport> SafeClient<T> {
    /// Create a client over an arbitrary transport.
    ///
    /// Starts the cost counter's decrement schedule, so this must be called
    /// from within a Tokio runtime.
    pub fn new(config: &SafeClientConfig, transport: T) -> Self {
        let counter = Arc::new(CostCounter::new(config.counter_config()));
        let gate = CallGate::new(transport, counter, config.counter_limit, config.call_cost);
        Self::with_gate(gate, config.max_tries)
    }

    /// Create a client from a prepared gate
    pub fn with_gate(gate: CallGate<T>, max_tries: u32) -> Self {
        Self {
            gate,
            max_tries: max_tries.max(1),
        }
    }

    /// Call `operation` with `args` forwarded verbatim to the transport
    pub async fn api(&self, operation: impl Into<String>, args: Vec<Value>) -> Result<Value> {
        self.call(&CallInvocation::new(operation, args)).await
    }

    /// Run an invocation through the gate until it succeeds, fails fatally,
    /// or runs out of attempts
    pub async fn call(&self, invocation: &CallInvocation) -> Result<Value> {
        let mut attempt = 0u32;

        while attempt < self.max_tries {
            attempt += 1;

            let err = match self.gate.execute(invocation).await {
                Ok(resp) => return Ok(resp),
                Err(err) => err,
            };

            match classify(&err) {
                Classification::Fatal => return Err(Error::rethrow(err)),
                Classification::Retriable if attempt < self.max_tries => {
                    info!(
                        "kraken '{}' failed with {}, attempt {}/{}",
                        invocation.operation(),
                        err,
                        attempt,
                        self.max_tries
                    );
                }
                Classification::Retriable => {
                    debug!(
                        "kraken '{}' failed with {} on the last attempt",
                        invocation.operation(),
                        err
                    );
                }
            }
        }

        Err(Error::exhausted(invocation, attempt))
    }

    /// Maximum attempts per call
    pub fn max_tries(&self) -> u32 {
        self.max_tries
    }

    /// Shared cost counter
    pub fn counter(&self) -> &CostCounter {
        self.gate.counter()
    }

    /// Call gate in front of the transport
    pub fn gate(&self) -> &CallGate<T> {
        &self.gate
    }

    /// Stop the cost counter's decrement schedule
    pub fn shutdown(&self) {
        self.gate.counter().stop();
    }
}

impl<T> std::fmt::Debug for SafeClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafeClient")
            .field("gate", &self.gate)
            .field("max_tries", &self.max_tries)
            .finish()
    }
}
