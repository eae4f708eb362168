//! Registry view for the universal resolver.
//!
//! The registry maps node identifiers to an owner and a resolver address.
//! Resolution only ever reads it through the [`Registry`] trait; the
//! in-memory [`InMemoryRegistry`] also carries owner-checked writes so that
//! fixtures and demos can build a name hierarchy.

pub mod errors;
pub mod registry;
pub mod types;

pub use errors::*;
pub use registry::InMemoryRegistry;
pub use types::*;

use std::sync::Arc;
use unires_types::{Address, NodeId};

/// Read-only view of the name registry.
pub trait Registry: Send + Sync {
    /// Owner of `node`, zero if unowned.
    fn owner(&self, node: &NodeId) -> Address;

    /// Resolver assigned to `node`, zero if unset.
    fn resolver(&self, node: &NodeId) -> Address;

    fn record(&self, node: &NodeId) -> RegistryRecord {
        RegistryRecord {
            owner: self.owner(node),
            resolver: self.resolver(node),
        }
    }
}

impl<T: Registry + ?Sized> Registry for Arc<T> {
    fn owner(&self, node: &NodeId) -> Address {
        (**self).owner(node)
    }

    fn resolver(&self, node: &NodeId) -> Address {
        (**self).resolver(node)
    }
}
