//! Configuration validation.
//!
//! Returns all validation errors, not just the first. Runs after parsing
//! and before any endpoint is dialed.

use alloy::primitives::Address;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::SweeperConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("receiver is the zero address")]
    ZeroReceiver,

    #[error("no endpoints configured")]
    NoEndpoints,

    #[error("endpoint #{0} is empty")]
    EmptyEndpoint(usize),

    #[error("metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

pub fn validate_config(config: &SweeperConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.receiver == Address::ZERO {
        errors.push(ValidationError::ZeroReceiver);
    }

    if config.endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }

    for (idx, endpoint) in config.endpoints.iter().enumerate() {
        if endpoint.trim().is_empty() {
            errors.push(ValidationError::EmptyEndpoint(idx));
        }
    }

    if let Some(metrics_address) = &config.metrics_address {
        if metrics_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(metrics_address.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
