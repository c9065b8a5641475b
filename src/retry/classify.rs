//! Classify transport failures into retriable or fatal.

use crate::transport::{TransportError, ETIMEDOUT, REQUEST_ERROR};

/// Status returned by the exchange's edge when the backend is overloaded
pub const OVERLOADED_STATUS: u16 = 520;

/// Outcome of inspecting a failed call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Transient server-side fault; safe to try again
    Retriable,
    /// Anything else; surfaced to the caller immediately
    Fatal,
}

/// Classify a transport failure.
///
/// Only two shapes are retried: an overload status, and a request-level
/// timeout. Unstructured and unrecognized failures are fatal.
pub fn classify(error: &TransportError) -> Classification {
    if !error.is_structured() {
        return Classification::Fatal;
    }

    if error.status_code() == Some(OVERLOADED_STATUS) {
        return Classification::Retriable;
    }

    if error.name() == Some(REQUEST_ERROR) && error.code() == Some(ETIMEDOUT) {
        return Classification::Retriable;
    }

    Classification::Fatal
}

/// Check if a transport failure may be retried
pub fn is_retriable(error: &TransportError) -> bool {
    classify(error) == Classification::Retriable
}
