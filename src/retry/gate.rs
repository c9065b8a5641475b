//! Admission control around a single transport call

use crate::counter::CostCounter;
use crate::transport::{CallInvocation, Transport, TransportError};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Waits on the cost counter, charges it, then issues the call.
///
/// The gate never classifies or retries; the transport's result or failure
/// is returned as is.
pub struct CallGate<T> {
    transport: T,
    counter: Arc<CostCounter>,
    ceiling: u64,
    cost: u64,
}

impl<T: Transport> CallGate<T> {
    /// Create a gate admitting calls while `counter` is at or below `ceiling`
    pub fn new(transport: T, counter: Arc<CostCounter>, ceiling: u64, cost: u64) -> Self {
        Self {
            transport,
            counter,
            ceiling,
            cost,
        }
    }

    /// Execute a call, charging the configured cost
    pub async fn execute(&self, invocation: &CallInvocation) -> Result<Value, TransportError> {
        self.execute_with_cost(self.cost, invocation).await
    }

    /// Execute a call, charging `cost` units.
    ///
    /// The charge is applied before the transport is invoked, so failed
    /// attempts are paid for too.
    pub async fn execute_with_cost(
        &self,
        cost: u64,
        invocation: &CallInvocation,
    ) -> Result<Value, TransportError> {
        debug!(call = %invocation.describe(), "api call");
        self.counter.wait_until_at_most(self.ceiling).await;
        debug!("done waiting");

        self.counter.increment(cost);
        let response = self
            .transport
            .call(invocation.operation(), invocation.args())
            .await;

        debug!(ok = response.is_ok(), "got resp");
        response
    }

    /// Shared cost counter
    pub fn counter(&self) -> &Arc<CostCounter> {
        &self.counter
    }

    /// Admission ceiling
    pub fn ceiling(&self) -> u64 {
        self.ceiling
    }

    /// Cost charged per call
    pub fn cost(&self) -> u64 {
        self.cost
    }

    /// Underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T> std::fmt::Debug for CallGate<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallGate")
            .field("counter", &self.counter)
            .field("ceiling", &self.ceiling)
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}
