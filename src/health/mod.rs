//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Periodic timer (monitor.rs)
//!     → one GET /healthz probe per registered backend, all concurrent
//!     → 2xx within the probe timeout    → mark healthy
//!     → anything else                    → mark unhealthy, log a warning
//! ```
//!
//! # Design Decisions
//! - Probes within a tick run concurrently: one hanging backend never delays
//!   the health determination of the others
//! - Single-probe transitions, no hysteresis; an unhealthy backend recovers
//!   on its first successful probe
//! - The monitor only flips health flags; it never adds or removes entries

pub mod monitor;

pub use monitor::HealthMonitor;
