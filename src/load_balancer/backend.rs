//! Backend service abstraction.
//!
//! # Responsibilities
//! - Represent a single backend endpoint identified by `(host, port)`
//! - Track health state (Unknown/Healthy/Unhealthy)
//! - Accumulate response time observations for latency-aware selection

use std::sync::atomic::{AtomicU8, Ordering};

use parking_lot::Mutex;

/// Health state of a backend.
///
/// New entries start `Unknown` and are not selectable until the first
/// successful probe.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Unknown = 0,
    Healthy = 1,
    Unhealthy = 2,
}

impl HealthState {
    pub fn as_str(self) -> &'static str {
        match self {
            HealthState::Unknown => "unknown",
            HealthState::Healthy => "healthy",
            HealthState::Unhealthy => "unhealthy",
        }
    }
}

impl From<u8> for HealthState {
    fn from(val: u8) -> Self {
        match val {
            1 => HealthState::Healthy,
            2 => HealthState::Unhealthy,
            _ => HealthState::Unknown,
        }
    }
}

/// Accumulated response time observations for one backend.
///
/// The average is always derived from the two accumulators; it is never
/// stored independently.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResponseStats {
    /// Number of recorded samples.
    pub total_requests: u64,
    /// Sum of recorded samples in milliseconds.
    pub total_response_time_ms: f64,
}

impl ResponseStats {
    /// Average response time in milliseconds; 0 when nothing was recorded.
    pub fn avg_response_time_ms(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.total_response_time_ms / self.total_requests as f64
        }
    }
}

/// A single backend endpoint.
#[derive(Debug)]
pub struct BackendService {
    /// Backend host name or address.
    pub host: String,
    /// Backend port.
    pub port: u16,
    /// Current health state, encoded as `HealthState as u8`.
    health: AtomicU8,
    /// Latency accumulators. A single lock keeps the pair consistent under
    /// concurrent updates; only the least-response-time strategy touches it.
    stats: Mutex<ResponseStats>,
}

impl BackendService {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            health: AtomicU8::new(HealthState::Unknown as u8),
            stats: Mutex::new(ResponseStats::default()),
        }
    }

    pub fn health(&self) -> HealthState {
        HealthState::from(self.health.load(Ordering::Relaxed))
    }

    pub fn is_healthy(&self) -> bool {
        self.health() == HealthState::Healthy
    }

    /// Set the health flag from a probe outcome.
    pub fn set_healthy(&self, healthy: bool) {
        let state = if healthy {
            HealthState::Healthy
        } else {
            HealthState::Unhealthy
        };
        self.health.store(state as u8, Ordering::Relaxed);
    }

    /// Record one latency sample in a single read-modify-write.
    pub fn record_sample(&self, elapsed_ms: f64) {
        let mut stats = self.stats.lock();
        stats.total_requests += 1;
        stats.total_response_time_ms += elapsed_ms;
    }

    /// Consistent copy of the accumulators.
    pub fn stats(&self) -> ResponseStats {
        *self.stats.lock()
    }

    pub fn avg_response_time_ms(&self) -> f64 {
        self.stats().avg_response_time_ms()
    }

    /// `host:port` identity, used in logs.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_unknown_with_zeroed_stats() {
        let service = BackendService::new("127.0.0.1", 3000);
        assert_eq!(service.health(), HealthState::Unknown);
        assert!(!service.is_healthy());
        assert_eq!(service.stats().total_requests, 0);
        assert_eq!(service.avg_response_time_ms(), 0.0);
    }

    #[test]
    fn health_flag_round_trips() {
        let service = BackendService::new("127.0.0.1", 3000);
        service.set_healthy(true);
        assert_eq!(service.health(), HealthState::Healthy);
        service.set_healthy(false);
        assert_eq!(service.health(), HealthState::Unhealthy);
    }

    #[test]
    fn average_derives_from_accumulators() {
        let service = BackendService::new("127.0.0.1", 3000);
        service.record_sample(100.0);
        service.record_sample(100.0);
        service.record_sample(300.0);
        let stats = service.stats();
        assert_eq!(stats.total_requests, 3);
        assert_eq!(stats.total_response_time_ms, 500.0);
        assert!((stats.avg_response_time_ms() - 166.666).abs() < 0.01);
    }
}
