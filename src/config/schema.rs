//! Configuration schema definitions.
//!
//! The file is JSON. Field names are kept compatible with existing
//! deployments, including the `reciever` spelling.

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Per-call node timeout used when the file does not set one.
pub const DEFAULT_RPC_TIMEOUT_SECS: u64 = 10;

/// Root configuration for the sweeper.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SweeperConfig {
    /// Address every replacement pays out to.
    #[serde(rename = "reciever")]
    pub receiver: Address,

    /// Node endpoints to watch, one monitor each.
    pub endpoints: Vec<String>,

    /// Timeout for individual node calls in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpc_timeout_secs: Option<u64>,

    /// Prometheus exporter bind address (e.g., "127.0.0.1:9100").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics_address: Option<String>,
}

impl SweeperConfig {
    pub fn rpc_timeout_secs(&self) -> u64 {
        self.rpc_timeout_secs.unwrap_or(DEFAULT_RPC_TIMEOUT_SECS)
    }

    /// Exporter bind address; validation guarantees a set value parses.
    pub fn metrics_socket_addr(&self) -> Option<SocketAddr> {
        self.metrics_address.as_deref().and_then(|addr| addr.parse().ok())
    }
}
