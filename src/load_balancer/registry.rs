//! Backend service registry.
//!
//! # Responsibilities
//! - Own the set of known backends, ordered by registration time
//! - Enforce `(host, port)` uniqueness (duplicate registration is a no-op)
//! - Hand out registration-ordered snapshots to strategies and the monitor
//!
//! # Design Decisions
//! - Membership changes only through explicit register/deregister; health
//!   probing flips flags and never adds or removes entries
//! - Readers get copies of the entry list, so selection never holds the lock
//!   across a network operation

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::BalancerError;
use crate::load_balancer::backend::BackendService;

/// Registration-ordered collection of backends with interior mutability.
#[derive(Debug, Default)]
pub struct ServiceRegistry {
    services: RwLock<Vec<Arc<BackendService>>>,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend. Duplicate `(host, port)` pairs are silently
    /// ignored; an empty host or zero port is rejected.
    pub fn register(&self, host: &str, port: u16) -> Result<(), BalancerError> {
        if host.is_empty() || port == 0 {
            return Err(BalancerError::InvalidService {
                host: host.to_string(),
                port,
            });
        }

        let mut services = self.services.write();
        if services.iter().any(|s| s.host == host && s.port == port) {
            return Ok(());
        }
        services.push(Arc::new(BackendService::new(host, port)));
        Ok(())
    }

    /// Remove every entry matching `(host, port)`. No-op if absent.
    pub fn deregister(&self, host: &str, port: u16) {
        let mut services = self.services.write();
        services.retain(|s| !(s.host == host && s.port == port));
    }

    /// Registration-ordered copy of the entries currently marked healthy.
    pub fn healthy_snapshot(&self) -> Vec<Arc<BackendService>> {
        self.services
            .read()
            .iter()
            .filter(|s| s.is_healthy())
            .cloned()
            .collect()
    }

    /// Registration-ordered copy of every entry regardless of health.
    pub fn all_services(&self) -> Vec<Arc<BackendService>> {
        self.services.read().clone()
    }

    /// Set the health flag of a backend. No-op if the entry was deregistered
    /// concurrently.
    pub fn mark_health(&self, host: &str, port: u16, healthy: bool) {
        if let Some(service) = self.find(host, port) {
            service.set_healthy(healthy);
        }
    }

    /// Look up a registered backend by identity.
    pub fn find(&self, host: &str, port: u16) -> Option<Arc<BackendService>> {
        self.services
            .read()
            .iter()
            .find(|s| s.host == host && s.port == port)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.services.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.read().is_empty()
    }
}
