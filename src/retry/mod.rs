//! Retry module
//!
//! Wraps exchange calls with admission control and bounded retries.
//!
//! # Features
//!
//! - **Call Gate**: waits on the cost counter and charges it before each call
//! - **Classification**: overload (520) and request timeouts are retried
//! - **Bounded Retries**: at most `max_tries` attempts, then a distinct
//!   exhaustion error
//! - **Provenance**: fatal failures keep the original transport error

mod classify;
mod client;
mod gate;

pub use classify::{classify, is_retriable, Classification, OVERLOADED_STATUS};
pub use client::SafeClient;
pub use gate::CallGate;
