// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Kraken Safe
//!
//! A resilience layer in front of the Kraken exchange REST API. Outgoing
//! calls are throttled against a self-draining cost budget, and calls that
//! fail with transient server-side errors are retried transparently while
//! every other failure is surfaced unchanged.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kraken_safe::{Result, SafeClient, SafeClientConfig};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = SafeClientConfig::builder()
//!         .credentials("api-key", "api-secret")
//!         .max_tries(3)
//!         .build();
//!     let client = SafeClient::http(&config)?;
//!
//!     let ticker = client.api("Ticker", vec![json!({"pair": "XXBTZUSD"})]).await?;
//!     println!("{ticker}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │          SafeClient::api(operation, args)                │
//! │   attempt loop ── classify ── info! / Rethrow / Exhausted│
//! └──────────────────────────────┬───────────────────────────┘
//!                                │
//! ┌──────────────────────────────┴───────────────────────────┐
//! │   CallGate: wait(counter ≤ limit) → charge → transport   │
//! └───────────────┬──────────────────────────┬───────────────┘
//!                 │                          │
//!      ┌──────────┴──────────┐    ┌──────────┴──────────┐
//!      │ CostCounter         │    │ Transport           │
//!      │ watch + drain task  │    │ HttpTransport (HTTP)│
//!      └─────────────────────┘    └─────────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Client configuration
pub mod config;

/// Self-draining cost counter
pub mod counter;

/// Transport seam and HTTP transport
pub mod transport;

/// Call gate, classification and retry loop
pub mod retry;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::SafeClientConfig;
pub use counter::{CostCounter, CounterConfig};
pub use error::{Error, Result};
pub use retry::{CallGate, Classification, SafeClient};
pub use transport::{CallInvocation, Credentials, HttpTransport, Transport, TransportError};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
