//! Keccak-256 hashing and the 32-byte node identifier.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

/// Keccak-256 digest of `data`.
pub fn keccak256(data: impl AsRef<[u8]>) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data.as_ref());
    hasher.finalize().into()
}

/// Hierarchical identifier of a name in the registry.
///
/// `NodeId(root)` is all zeroes and every child is
/// `keccak256(parent ‖ labelhash)`, see [`NodeId::child`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NodeId(pub [u8; 32]);

impl NodeId {
    pub const ROOT: NodeId = NodeId([0u8; 32]);

    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Identifier of the child of `self` whose label hashes to `labelhash`.
    pub fn child(&self, labelhash: &[u8; 32]) -> NodeId {
        let mut hasher = Keccak256::new();
        hasher.update(self.0);
        hasher.update(labelhash);
        NodeId(hasher.finalize().into())
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.to_hex())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<[u8; 32]> for NodeId {
    fn from(value: [u8; 32]) -> Self {
        NodeId(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keccak_of_empty_input() {
        assert_eq!(
            hex::encode(keccak256([])),
            "c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470"
        );
    }

    #[test]
    fn child_of_root_matches_known_node() {
        // node of "eth"
        let eth = NodeId::ROOT.child(&keccak256(b"eth"));
        assert_eq!(
            eth.to_hex(),
            "0x93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
        );
    }
}
