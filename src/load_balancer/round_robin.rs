// src/load_balancer/round_robin.rs
use crate::config::ConfigError;
use crate::load_balancer::LoadBalancer;
use crate::proxy::Backend;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Strict rotation over a fixed, non-empty backend list.
///
/// The cursor is advanced with a single atomic read-modify-write, so concurrent
/// callers always observe distinct consecutive positions.
#[derive(Debug)]
pub struct RoundRobinBalancer {
    backends: Vec<Backend>,
    cursor: AtomicUsize,
}

impl RoundRobinBalancer {
    pub fn new(backends: Vec<Backend>) -> Result<Self, ConfigError> {
        Self::with_cursor(backends, 0)
    }

    /// Starts the rotation at `start` (taken modulo the backend count).
    pub fn with_cursor(backends: Vec<Backend>, start: usize) -> Result<Self, ConfigError> {
        if backends.is_empty() {
            return Err(ConfigError::NoBackends);
        }

        let start = start % backends.len();
        Ok(Self {
            backends,
            cursor: AtomicUsize::new(start),
        })
    }

    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }
}

impl LoadBalancer for RoundRobinBalancer {
    fn take_next(&self) -> &Backend {
        let len = self.backends.len();
        // The closure never returns None, so both arms carry the previous cursor.
        let index = match self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some((current + 1) % len)
            }) {
            Ok(previous) | Err(previous) => previous,
        };

        &self.backends[index]
    }

    fn backends(&self) -> &[Backend] {
        &self.backends
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}
