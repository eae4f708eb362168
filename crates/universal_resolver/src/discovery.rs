//! Resolver discovery
//!
//! Walks a name from the leaf towards the root and stops at the first
//! ancestor whose registry record names a resolver.

use tracing::debug;
use unires_names::Name;
use unires_registry::Registry;
use unires_types::{Address, NodeId};

/// Resolver found for a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverMatch {
    /// Resolver address, zero when no ancestor has one
    pub resolver: Address,
    /// Node of the ancestor that carried the resolver
    pub node: NodeId,
    /// Wire offset of that ancestor inside the queried name
    pub offset: usize,
}

impl ResolverMatch {
    pub fn is_found(&self) -> bool {
        !self.resolver.is_zero()
    }
}

/// Closest-to-leaf resolver for `name`. Probes at most `label_count() + 1`
/// nodes, the root included.
pub fn find_resolver(registry: &dyn Registry, name: &Name) -> ResolverMatch {
    let ancestors = name.ancestors();
    for ancestor in &ancestors {
        let resolver = registry.resolver(&ancestor.node);
        if !resolver.is_zero() {
            debug!(%name, %resolver, node = %ancestor.node, "resolver found");
            return ResolverMatch {
                resolver,
                node: ancestor.node,
                offset: ancestor.offset,
            };
        }
    }
    debug!(%name, "no resolver on any ancestor");
    ResolverMatch {
        resolver: Address::ZERO,
        node: NodeId::ROOT,
        offset: ancestors.last().map(|root| root.offset).unwrap_or_default(),
    }
}
