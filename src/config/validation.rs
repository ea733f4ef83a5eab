//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports non-zero)
//! - Check the strategy string is a recognized kind
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before the config is accepted into the system

use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::GatewayConfig;
use crate::load_balancer::StrategyKind;

/// A single semantic violation in the configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener bind address must not be empty")]
    EmptyBindAddress,

    #[error("unknown load balancer strategy: {0:?} (expected \"static\" or \"lrt\")")]
    UnknownStrategy(String),

    #[error("backend #{index}: host must not be empty")]
    EmptyBackendHost { index: usize },

    #[error("backend #{index}: port must be non-zero")]
    ZeroBackendPort { index: usize },

    #[error("health check interval must be non-zero")]
    ZeroHealthInterval,

    #[error("health check timeout must be non-zero")]
    ZeroHealthTimeout,

    #[error("proxy timeout must be non-zero")]
    ZeroProxyTimeout,

    #[error("max body size must be non-zero")]
    ZeroBodyLimit,

    #[error("admin bind address must not be empty when the admin API is enabled")]
    EmptyAdminBindAddress,
}

/// Validate a parsed configuration, collecting every violation.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.is_empty() {
        errors.push(ValidationError::EmptyBindAddress);
    }

    if StrategyKind::from_str(&config.load_balancer.strategy).is_err() {
        errors.push(ValidationError::UnknownStrategy(
            config.load_balancer.strategy.clone(),
        ));
    }

    for (index, backend) in config.backends.iter().enumerate() {
        if backend.host.is_empty() {
            errors.push(ValidationError::EmptyBackendHost { index });
        }
        if backend.port == 0 {
            errors.push(ValidationError::ZeroBackendPort { index });
        }
    }

    if config.health_check.interval_secs == 0 {
        errors.push(ValidationError::ZeroHealthInterval);
    }
    if config.health_check.timeout_secs == 0 {
        errors.push(ValidationError::ZeroHealthTimeout);
    }
    if config.timeouts.proxy_secs == 0 {
        errors.push(ValidationError::ZeroProxyTimeout);
    }
    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }
    if config.admin.enabled && config.admin.bind_address.is_empty() {
        errors.push(ValidationError::EmptyAdminBindAddress);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
