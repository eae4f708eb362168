//! Universal resolution service
//!
//! Resolves records of hierarchical names through a registry of resolvers:
//! - Resolver discovery, closest ancestor first
//! - Legacy and extended resolver calling conventions
//! - Batched queries with per-slot failure isolation
//! - Off-store lookups through a stateless suspend/resume protocol
//! - Reverse resolution of addresses to names

pub mod client;
pub mod config;
pub mod contract;
pub mod discovery;
mod dispatch;
pub mod errors;
pub mod gateway;
pub mod lookup;
pub mod records;
pub mod types;
pub mod universal;

pub use client::{ClientError, LookupClient};
pub use config::{ClientConfig, ResolverConfig};
pub use contract::{CallError, Capability, InMemoryDirectory, Resolver, ResolverDirectory};
pub use discovery::{find_resolver, ResolverMatch};
pub use errors::*;
pub use gateway::{
    decode_query, decode_replies, encode_query, encode_replies, Gateway, GatewayError,
    GatewayReply, GatewayRequest, LocalGateway, OffchainServer,
};
pub use lookup::{ContinuationToken, OffchainLookup, ReverseMetadata, SlotContinuation};
pub use records::RecordResolver;
pub use types::*;
pub use universal::UniversalResolver;
