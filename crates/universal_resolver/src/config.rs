//! Resolver and lookup-client configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use unires_names::DEFAULT_REVERSE_SUFFIX;
use unires_types::Address;

/// Configuration of the universal resolver core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Address reported as the sender of suspend signals
    pub address: Address,
    /// Batch gateways used when the caller does not supply its own list
    pub batch_gateway_urls: Vec<String>,
    /// Parent name of reverse records
    pub reverse_suffix: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            address: Address::ZERO,
            batch_gateway_urls: Vec::new(),
            reverse_suffix: DEFAULT_REVERSE_SUFFIX.to_string(),
        }
    }
}

/// Policy of the off-store lookup client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Gateway round trips allowed before giving up
    pub max_lookups: usize,
    /// Timeout of one gateway round trip, in milliseconds
    pub gateway_timeout_ms: u64,
}

impl ClientConfig {
    pub fn gateway_timeout(&self) -> Duration {
        Duration::from_millis(self.gateway_timeout_ms)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            max_lookups: 4,
            gateway_timeout_ms: 5_000,
        }
    }
}
