//! Self-draining cost counter
//!
//! Calls charge cost units; a background tick drains them at a fixed pace.
//! The value lives in a `tokio::sync::watch` channel so every mutation is
//! serialized and every waiter re-evaluates its ceiling after each change.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::trace;

/// Configuration for the decrement schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterConfig {
    /// Time between two decrement ticks
    pub dec_interval: Duration,
    /// Units removed on every tick
    pub dec_step: u64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            dec_interval: Duration::from_millis(3000),
            dec_step: 1,
        }
    }
}

impl CounterConfig {
    /// Create a new counter config
    pub fn new(dec_interval: Duration, dec_step: u64) -> Self {
        Self {
            dec_interval,
            dec_step,
        }
    }
}

/// Leaky-bucket budget shared by every call of a client
pub struct CostCounter {
    state: Arc<watch::Sender<u64>>,
    config: CounterConfig,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl CostCounter {
    /// Create a counter and start its decrement schedule.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: CounterConfig) -> Self {
        let (sender, _) = watch::channel(0u64);
        let state = Arc::new(sender);
        let ticker = spawn_ticker(Arc::downgrade(&state), &config);

        Self {
            state,
            config,
            ticker: Mutex::new(Some(ticker)),
        }
    }

    /// Current budget value
    pub fn value(&self) -> u64 {
        *self.state.borrow()
    }

    /// Decrement schedule of this counter
    pub fn config(&self) -> &CounterConfig {
        &self.config
    }

    /// Charge `amount` units
    pub fn increment(&self, amount: u64) {
        self.state.send_modify(|value| *value = value.saturating_add(amount));
    }

    /// Resolve once the budget is at or below `ceiling`
    pub async fn wait_until_at_most(&self, ceiling: u64) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this cannot observe a close.
        let _ = rx.wait_for(|value| *value <= ceiling).await;
    }

    /// Stop the decrement schedule. The budget keeps its current value.
    pub fn stop(&self) {
        if let Some(handle) = self.take_ticker() {
            handle.abort();
        }
    }

    /// Whether the decrement schedule is still running
    pub fn is_running(&self) -> bool {
        self.ticker
            .lock()
            .map(|ticker| ticker.as_ref().is_some_and(|handle| !handle.is_finished()))
            .unwrap_or(false)
    }

    fn take_ticker(&self) -> Option<JoinHandle<()>> {
        match self.ticker.lock() {
            Ok(mut ticker) => ticker.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

impl Drop for CostCounter {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for CostCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CostCounter")
            .field("value", &self.value())
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish()
    }
}

fn spawn_ticker(state: Weak<watch::Sender<u64>>, config: &CounterConfig) -> JoinHandle<()> {
    // tokio intervals reject a zero period
    let period = config.dec_interval.max(Duration::from_millis(1));
    let step = config.dec_step;

    tokio::spawn(async move {
        let mut ticks = interval_at(Instant::now() + period, period);
        loop {
            ticks.tick().await;
            let Some(state) = state.upgrade() else {
                break;
            };
            state.send_if_modified(|value| {
                if *value == 0 {
                    return false;
                }
                *value = value.saturating_sub(step);
                true
            });
            trace!(value = *state.borrow(), "cost counter tick");
        }
    })
}
