//! In-memory registry implementation
//!
//! Stores node records behind a lock. Writes follow the registry's
//! ownership rule: only the owner of a node may assign its resolver, hand
//! it to a new owner or create children under it.

use crate::errors::*;
use crate::types::*;
use crate::Registry;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use unires_types::{Address, NodeId};

#[derive(Debug)]
pub struct InMemoryRegistry {
    /// Node → record mapping
    records: Arc<RwLock<HashMap<NodeId, RegistryRecord>>>,
}

impl InMemoryRegistry {
    /// Create a registry whose root node is owned by `root_owner`
    pub fn new(root_owner: Address) -> Self {
        let mut records = HashMap::new();
        records.insert(
            NodeId::ROOT,
            RegistryRecord {
                owner: root_owner,
                resolver: Address::ZERO,
            },
        );
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Create or reassign the child `labelhash` of `parent`, returning the
    /// child's node.
    pub fn set_subnode_owner(
        &self,
        caller: Address,
        parent: &NodeId,
        labelhash: &[u8; 32],
        owner: Address,
    ) -> Result<NodeId> {
        self.authorize(caller, parent)?;
        let node = parent.child(labelhash);
        let mut records = self.records.write();
        records.entry(node).or_default().owner = owner;
        debug!(%node, %owner, "subnode owner set");
        Ok(node)
    }

    /// Assign the resolver of `node`
    pub fn set_resolver(&self, caller: Address, node: &NodeId, resolver: Address) -> Result<()> {
        self.authorize(caller, node)?;
        let mut records = self.records.write();
        records.entry(*node).or_default().resolver = resolver;
        debug!(%node, %resolver, "resolver set");
        Ok(())
    }

    /// Transfer ownership of `node`
    pub fn set_owner(&self, caller: Address, node: &NodeId, owner: Address) -> Result<()> {
        self.authorize(caller, node)?;
        let mut records = self.records.write();
        records.entry(*node).or_default().owner = owner;
        Ok(())
    }

    fn authorize(&self, caller: Address, node: &NodeId) -> Result<()> {
        let owner = self.owner(node);
        if owner.is_zero() || owner != caller {
            return Err(RegistryError::Unauthorized {
                caller,
                node: *node,
            });
        }
        Ok(())
    }
}

impl Registry for InMemoryRegistry {
    fn owner(&self, node: &NodeId) -> Address {
        let records = self.records.read();
        records.get(node).map(|r| r.owner).unwrap_or_default()
    }

    fn resolver(&self, node: &NodeId) -> Address {
        let records = self.records.read();
        records.get(node).map(|r| r.resolver).unwrap_or_default()
    }

    fn record(&self, node: &NodeId) -> RegistryRecord {
        let records = self.records.read();
        records.get(node).copied().unwrap_or_default()
    }
}

impl Default for InMemoryRegistry {
    fn default() -> Self {
        Self::new(Address::ZERO)
    }
}
