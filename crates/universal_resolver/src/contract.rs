//! Resolver contracts as seen from the universal resolver
//!
//! A resolver is anything that answers ABI calldata with ABI return data or
//! a revert. The [`ResolverDirectory`] maps the addresses found in the
//! registry to live resolvers.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use unires_abi::{ParamType, Token};
use unires_types::{selectors, Address};

/// Why a resolver call produced no return data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// The call reverted with this payload (possibly empty)
    Revert(Vec<u8>),
    /// Nothing is deployed at the address
    NoCode(Address),
}

impl CallError {
    pub fn revert_data(&self) -> &[u8] {
        match self {
            CallError::Revert(data) => data,
            CallError::NoCode(_) => &[],
        }
    }
}

/// A resolver contract.
pub trait Resolver: Send + Sync {
    /// Execute `data` against this resolver.
    fn call(&self, data: &[u8]) -> Result<Vec<u8>, CallError>;
}

impl<T: Resolver + ?Sized> Resolver for Arc<T> {
    fn call(&self, data: &[u8]) -> Result<Vec<u8>, CallError> {
        (**self).call(data)
    }
}

/// Lookup of deployed resolvers by address.
pub trait ResolverDirectory: Send + Sync {
    fn resolver_at(&self, address: &Address) -> Option<Arc<dyn Resolver>>;

    /// Call the resolver at `address`. A missing resolver yields [`CallError::NoCode`].
    fn call(&self, address: &Address, data: &[u8]) -> Result<Vec<u8>, CallError> {
        match self.resolver_at(address) {
            Some(resolver) => resolver.call(data),
            None => Err(CallError::NoCode(*address)),
        }
    }
}

impl<T: ResolverDirectory + ?Sized> ResolverDirectory for Arc<T> {
    fn resolver_at(&self, address: &Address) -> Option<Arc<dyn Resolver>> {
        (**self).resolver_at(address)
    }
}

/// Directory backed by an in-memory map.
#[derive(Default)]
pub struct InMemoryDirectory {
    resolvers: RwLock<HashMap<Address, Arc<dyn Resolver>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deploy(&self, address: Address, resolver: Arc<dyn Resolver>) {
        debug!(%address, "deployed resolver");
        self.resolvers.write().insert(address, resolver);
    }

    pub fn remove(&self, address: &Address) -> bool {
        self.resolvers.write().remove(address).is_some()
    }

    pub fn len(&self) -> usize {
        self.resolvers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.read().is_empty()
    }
}

impl ResolverDirectory for InMemoryDirectory {
    fn resolver_at(&self, address: &Address) -> Option<Arc<dyn Resolver>> {
        self.resolvers.read().get(address).cloned()
    }
}

/// Calling convention a resolver supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Per-record queries only
    LegacyOnly,
    /// Name-aware `resolve(bytes,bytes)`
    Extended,
}

impl Capability {
    /// Ask `resolver` whether it supports the extended interface. Any
    /// failure, including malformed answers, means legacy.
    pub fn probe(directory: &dyn ResolverDirectory, resolver: &Address) -> Capability {
        let query = unires_abi::encode_call(
            &selectors::SUPPORTS_INTERFACE,
            &[Token::selector(&selectors::RESOLVE)],
        );
        let answer = match directory.call(resolver, &query) {
            Ok(answer) => answer,
            Err(err) => {
                debug!(%resolver, ?err, "capability probe failed, treating as legacy");
                return Capability::LegacyOnly;
            }
        };
        match unires_abi::decode(&[ParamType::Bool], &answer)
            .ok()
            .and_then(|mut tokens| tokens.pop())
            .and_then(Token::into_bool)
        {
            Some(true) => Capability::Extended,
            Some(false) => Capability::LegacyOnly,
            None => {
                debug!(%resolver, "capability probe returned garbage, treating as legacy");
                Capability::LegacyOnly
            }
        }
    }

    pub fn is_extended(&self) -> bool {
        matches!(self, Capability::Extended)
    }
}
