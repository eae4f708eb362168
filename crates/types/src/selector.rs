//! Four-byte entry point selectors.

use crate::hash::keccak256;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;

/// First four bytes of the Keccak-256 hash of a canonical signature.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Selector(pub [u8; 4]);

impl Selector {
    pub const ZERO: Selector = Selector([0u8; 4]);

    /// Derives the selector of a canonical signature such as `addr(bytes32)`.
    pub fn from_signature(signature: &str) -> Selector {
        let digest = keccak256(signature.as_bytes());
        Selector([digest[0], digest[1], digest[2], digest[3]])
    }

    /// Leading selector of `data`; short input is zero-padded on the right.
    pub fn of(data: &[u8]) -> Selector {
        let mut out = [0u8; 4];
        let n = data.len().min(4);
        out[..n].copy_from_slice(&data[..n]);
        Selector(out)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 4]
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Debug for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Selector(0x{})", hex::encode(self.0))
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Selectors of the record and protocol entry points the resolver speaks.
pub mod selectors {
    use super::*;

    pub static ADDR: Lazy<Selector> = Lazy::new(|| Selector::from_signature("addr(bytes32)"));
    pub static ADDR_MULTICOIN: Lazy<Selector> =
        Lazy::new(|| Selector::from_signature("addr(bytes32,uint256)"));
    pub static TEXT: Lazy<Selector> =
        Lazy::new(|| Selector::from_signature("text(bytes32,string)"));
    pub static NAME: Lazy<Selector> = Lazy::new(|| Selector::from_signature("name(bytes32)"));
    pub static SUPPORTS_INTERFACE: Lazy<Selector> =
        Lazy::new(|| Selector::from_signature("supportsInterface(bytes4)"));
    /// Also the interface id of the extended resolution capability.
    pub static RESOLVE: Lazy<Selector> =
        Lazy::new(|| Selector::from_signature("resolve(bytes,bytes)"));
    pub static OFFCHAIN_LOOKUP: Lazy<Selector> = Lazy::new(|| {
        Selector::from_signature("OffchainLookup(address,string[],bytes,bytes4,bytes)")
    });
    pub static GATEWAY_QUERY: Lazy<Selector> =
        Lazy::new(|| Selector::from_signature("query((address,string[],bytes)[])"));
    pub static RESOLVE_SINGLE_CALLBACK: Lazy<Selector> =
        Lazy::new(|| Selector::from_signature("resolveSingleCallback(bytes,bytes)"));
    pub static RESOLVE_CALLBACK: Lazy<Selector> =
        Lazy::new(|| Selector::from_signature("resolveCallback(bytes,bytes)"));
    pub static REVERSE_CALLBACK: Lazy<Selector> =
        Lazy::new(|| Selector::from_signature("reverseCallback(bytes,bytes)"));
}

#[cfg(test)]
mod tests {
    use super::selectors::*;
    use super::*;

    #[test]
    fn well_known_selectors() {
        assert_eq!(ADDR.to_string(), "0x3b3b57de");
        assert_eq!(ADDR_MULTICOIN.to_string(), "0xf1cb7e06");
        assert_eq!(TEXT.to_string(), "0x59d1d43c");
        assert_eq!(NAME.to_string(), "0x691f3431");
        assert_eq!(SUPPORTS_INTERFACE.to_string(), "0x01ffc9a7");
        assert_eq!(RESOLVE.to_string(), "0x9061b923");
        assert_eq!(OFFCHAIN_LOOKUP.to_string(), "0x556f1830");
        assert_eq!(GATEWAY_QUERY.to_string(), "0xa780bab6");
        assert_eq!(RESOLVE_CALLBACK.to_string(), "0xb4a85801");
        assert_eq!(RESOLVE_SINGLE_CALLBACK.to_string(), "0xe0a85412");
        assert_eq!(REVERSE_CALLBACK.to_string(), "0x6dc4fb73");
    }

    #[test]
    fn selector_of_short_input_is_padded() {
        assert_eq!(Selector::of(&[]), Selector::ZERO);
        assert_eq!(Selector::of(&[0x69, 0x1f]), Selector([0x69, 0x1f, 0, 0]));
    }
}
