// src/load_balancer/algorithm.rs
use crate::proxy::Backend;

/// Picks the backend for each inbound request.
pub trait LoadBalancer: Send + Sync {
    /// Returns the backend for the next request and advances the selection state.
    fn take_next(&self) -> &Backend;

    fn backends(&self) -> &[Backend];

    fn name(&self) -> &'static str;
}
