//! Types for the registry view

use serde::{Deserialize, Serialize};
use unires_types::Address;

/// What the registry stores for one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RegistryRecord {
    /// Principal allowed to change the node
    pub owner: Address,
    /// Resolver answering queries for the node (zero if unset)
    pub resolver: Address,
}

impl RegistryRecord {
    pub fn has_resolver(&self) -> bool {
        !self.resolver.is_zero()
    }
}
