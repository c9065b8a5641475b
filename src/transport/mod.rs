//! Transport module
//!
//! The seam between the resilience layer and the exchange API client.
//!
//! # Features
//!
//! - **Transport Trait**: any async `call(operation, args)` implementation
//! - **Failure Shapes**: status, request-level, API and bare-message failures
//! - **HTTP Transport**: reqwest client for the Kraken REST endpoints

mod http;
mod types;

pub use http::{HttpTransport, RequestSigner, DEFAULT_BASE_URL, PUBLIC_OPERATIONS};
pub use types::{
    CallInvocation, Credentials, Transport, TransportError, API_KEY_ENV, API_SECRET_ENV,
    ECONNREFUSED, EPARSE, EREQUEST, ETIMEDOUT, PARSE_ERROR, REQUEST_ERROR,
};
