//! HTTP load balancing gateway.
//!
//! Routes inbound HTTP requests across a pool of backend services, tracking
//! their health with periodic probes and choosing a target per request with
//! a configurable strategy (static round robin or least response time).
//! Observed latency is fed back into the strategy after each response.

pub mod admin;
pub mod config;
pub mod error;
pub mod health;
pub mod http;
pub mod lifecycle;
pub mod load_balancer;

pub use config::GatewayConfig;
pub use error::BalancerError;
pub use http::GatewayServer;
pub use lifecycle::Shutdown;
