//! Cost counter module
//!
//! Admission budget for outgoing calls. Each call charges a fixed number of
//! cost units and a background tick drains them, so callers pace
//! themselves by waiting for the budget to fall under a ceiling instead of
//! sleeping for a guessed interval.

mod cost_counter;

pub use cost_counter::{CostCounter, CounterConfig};
