//! Least-response-time selection strategy.

use std::sync::Arc;

use crate::error::BalancerError;
use crate::load_balancer::backend::BackendService;
use crate::load_balancer::registry::ServiceRegistry;
use crate::load_balancer::SelectionStrategy;

/// Picks the healthy backend with the lowest observed average response time.
///
/// Ties, including the cold-start case where several backends have no
/// samples yet, resolve to the first occurrence in the snapshot, favoring
/// earliest-registered entries.
#[derive(Debug)]
pub struct LeastResponseTime {
    registry: Arc<ServiceRegistry>,
}

impl LeastResponseTime {
    pub fn new(registry: Arc<ServiceRegistry>) -> Self {
        Self { registry }
    }
}

impl SelectionStrategy for LeastResponseTime {
    fn select_next(&self) -> Result<Arc<BackendService>, BalancerError> {
        let snapshot = self.registry.healthy_snapshot();

        // Stable left-to-right scan with strict `<`, so the earliest entry
        // wins ties.
        let mut fastest: Option<&Arc<BackendService>> = None;
        let mut fastest_avg = f64::INFINITY;
        for service in &snapshot {
            let avg = service.avg_response_time_ms();
            if avg < fastest_avg {
                fastest = Some(service);
                fastest_avg = avg;
            }
        }

        fastest.cloned().ok_or(BalancerError::NoHealthyService)
    }

    fn record_response_time(
        &self,
        host: &str,
        port: u16,
        elapsed_ms: f64,
    ) -> Result<(), BalancerError> {
        if !elapsed_ms.is_finite() || elapsed_ms < 0.0 {
            return Err(BalancerError::InvalidMeasurement(elapsed_ms));
        }
        let service =
            self.registry
                .find(host, port)
                .ok_or_else(|| BalancerError::ServiceNotFound {
                    host: host.to_string(),
                    port,
                })?;
        service.record_sample(elapsed_ms);
        Ok(())
    }
}
