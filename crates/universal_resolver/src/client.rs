//! Async lookup client
//!
//! Drives a resolution to completion: every suspend signal is sent to the
//! gateway and the answer fed back through the callback it names. The
//! number of round trips and the time spent in each are bounded.

use crate::config::ClientConfig;
use crate::errors::ResolveError;
use crate::gateway::{Gateway, GatewayError};
use crate::types::*;
use crate::universal::UniversalResolver;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, warn};
use unires_names::Name;
use unires_types::Address;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("Gateway did not answer within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("Gave up after {limit} off-store lookups")]
    TooManyLookups { limit: usize },

    #[error("Suspend signal from {found}, expected {expected}")]
    UnexpectedSender { expected: Address, found: Address },

    #[error("Resolution resumed through an unexpected entry point")]
    UnexpectedCallback,
}

pub type Result<T> = std::result::Result<T, ClientError>;

pub struct LookupClient {
    resolver: Arc<UniversalResolver>,
    gateway: Arc<dyn Gateway>,
    config: ClientConfig,
}

impl LookupClient {
    pub fn new(
        resolver: Arc<UniversalResolver>,
        gateway: Arc<dyn Gateway>,
        config: ClientConfig,
    ) -> Self {
        Self {
            resolver,
            gateway,
            config,
        }
    }

    pub async fn resolve(&self, name: &Name, query: &[u8]) -> Result<SingleResolution> {
        let first = self.resolver.resolve(name, query)?.map(Resumed::Single);
        match self.drive(first).await? {
            Resumed::Single(single) => Ok(single),
            _ => Err(ClientError::UnexpectedCallback),
        }
    }

    pub async fn resolve_batch(&self, name: &Name, queries: &[Vec<u8>]) -> Result<BatchResolution> {
        let first = self.resolver.resolve_batch(name, queries)?.map(Resumed::Batch);
        match self.drive(first).await? {
            Resumed::Batch(batch) => Ok(batch),
            _ => Err(ClientError::UnexpectedCallback),
        }
    }

    pub async fn reverse(&self, address: &Address) -> Result<ReverseRecord> {
        let first = self.resolver.reverse_address(address)?.map(Resumed::Reverse);
        match self.drive(first).await? {
            Resumed::Reverse(record) => Ok(record),
            _ => Err(ClientError::UnexpectedCallback),
        }
    }

    /// Follow suspend signals until a value is produced.
    pub async fn drive(&self, mut resolution: Resolution<Resumed>) -> Result<Resumed> {
        let mut lookups = 0;
        loop {
            let lookup = match resolution {
                Resolution::Complete(value) => return Ok(value),
                Resolution::Suspended(lookup) => lookup,
            };
            if lookup.sender != self.resolver.address() {
                return Err(ClientError::UnexpectedSender {
                    expected: self.resolver.address(),
                    found: lookup.sender,
                });
            }
            if lookups >= self.config.max_lookups {
                warn!(limit = self.config.max_lookups, "lookup limit reached");
                return Err(ClientError::TooManyLookups {
                    limit: self.config.max_lookups,
                });
            }
            lookups += 1;

            debug!(round = lookups, urls = ?lookup.urls, "querying gateway");
            let response = timeout(
                self.config.gateway_timeout(),
                self.gateway.query(&lookup.urls, &lookup.call_data),
            )
            .await
            .map_err(|_| ClientError::Timeout {
                timeout_ms: self.config.gateway_timeout_ms,
            })??;

            resolution =
                self.resolver
                    .handle_callback(&lookup.callback, &response, &lookup.extra_data)?;
        }
    }
}
