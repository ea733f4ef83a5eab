//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → strategy.select_next()
//!         → registry.healthy_snapshot() (registration-ordered copy)
//!         → round_robin.rs (rotate cursor over the snapshot)
//!         — or —
//!         → least_response_time.rs (minimum observed average latency)
//!     → proxy forwards to the chosen backend
//!     → strategy.record_response_time() (feeds latency back)
//! ```
//!
//! # Design Decisions
//! - One `SelectionStrategy` trait with a closed set of variants, picked
//!   once at startup by `StrategyKind`
//! - Strategies hold the registry and operate on per-call healthy snapshots
//! - `record_response_time` defaults to a no-op so the proxy can call it
//!   unconditionally; only the LRT variant overrides it

pub mod backend;
pub mod least_response_time;
pub mod registry;
pub mod round_robin;

use std::str::FromStr;
use std::sync::Arc;

use crate::error::BalancerError;
use backend::BackendService;
use least_response_time::LeastResponseTime;
use registry::ServiceRegistry;
use round_robin::RoundRobin;

/// A policy that picks one healthy backend per request.
pub trait SelectionStrategy: Send + Sync {
    /// Select the next backend from the current healthy snapshot.
    fn select_next(&self) -> Result<Arc<BackendService>, BalancerError>;

    /// Feed an observed latency sample (milliseconds) back into the strategy.
    ///
    /// Strategies that do not track latency ignore the sample.
    fn record_response_time(
        &self,
        _host: &str,
        _port: u16,
        _elapsed_ms: f64,
    ) -> Result<(), BalancerError> {
        Ok(())
    }
}

/// Strategy kinds accepted in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Static round-robin rotation (`"static"`).
    RoundRobin,
    /// Least observed average response time (`"lrt"`).
    LeastResponseTime,
}

impl FromStr for StrategyKind {
    type Err = BalancerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("static") {
            Ok(StrategyKind::RoundRobin)
        } else if s.eq_ignore_ascii_case("lrt") {
            Ok(StrategyKind::LeastResponseTime)
        } else {
            Err(BalancerError::UnknownStrategy(s.to_string()))
        }
    }
}

/// Build the strategy selected in configuration.
pub fn build_strategy(
    kind: StrategyKind,
    registry: Arc<ServiceRegistry>,
) -> Arc<dyn SelectionStrategy> {
    match kind {
        StrategyKind::RoundRobin => Arc::new(RoundRobin::new(registry)),
        StrategyKind::LeastResponseTime => Arc::new(LeastResponseTime::new(registry)),
    }
}
