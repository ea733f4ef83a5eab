//! Error definitions for the load balancing engine.

use thiserror::Error;

/// Errors produced by the registry and selection strategies.
///
/// Proxy-boundary failures (bad gateway, gateway timeout) are synthesized
/// directly as HTTP responses in the request handler and never pass through
/// this enum. Health probe failures are contained in the monitor and only
/// surface as state flags.
#[derive(Debug, Error, PartialEq)]
pub enum BalancerError {
    /// Malformed registration input: empty host or zero port.
    #[error("invalid service registration: host={host:?} port={port}")]
    InvalidService { host: String, port: u16 },

    /// Unrecognized strategy kind in configuration. Fatal at startup.
    #[error("unknown load balancer strategy: {0:?}")]
    UnknownStrategy(String),

    /// The healthy snapshot was empty at selection time. Transient; the
    /// request boundary converts this to a 503.
    #[error("no healthy backend services available")]
    NoHealthyService,

    /// A response time was recorded against a backend that is not registered.
    #[error("service {host}:{port} not found")]
    ServiceNotFound { host: String, port: u16 },

    /// A response time sample was negative or non-finite.
    #[error("invalid response time measurement: {0}ms")]
    InvalidMeasurement(f64),
}
