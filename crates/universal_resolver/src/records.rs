//! In-memory record resolver
//!
//! A public-resolver style [`Resolver`] answering `addr`, multi-coin `addr`,
//! `text` and `name` queries. It also implements the extended
//! `resolve(bytes,bytes)` convention by running the inner query against
//! itself.

use crate::contract::{CallError, Resolver};
use parking_lot::RwLock;
use std::collections::HashMap;
use unires_abi::{ParamType, Token};
use unires_types::{selectors, Address, NodeId, Selector};

/// Coin type of the native address record.
pub const COIN_TYPE_NATIVE: u64 = 60;

#[derive(Debug, Default)]
struct Records {
    addrs: HashMap<NodeId, Address>,
    coin_addrs: HashMap<(NodeId, [u8; 32]), Vec<u8>>,
    texts: HashMap<(NodeId, String), String>,
    names: HashMap<NodeId, String>,
}

#[derive(Debug, Default)]
pub struct RecordResolver {
    records: RwLock<Records>,
}

fn coin_key(coin_type: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&coin_type.to_be_bytes());
    word
}

fn revert() -> CallError {
    CallError::Revert(Vec::new())
}

impl RecordResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_addr(&self, node: &NodeId, address: Address) {
        self.records.write().addrs.insert(*node, address);
    }

    pub fn set_addr_for_coin(&self, node: &NodeId, coin_type: u64, address: Vec<u8>) {
        if coin_type == COIN_TYPE_NATIVE {
            if let Ok(bytes) = <[u8; 20]>::try_from(address.as_slice()) {
                self.set_addr(node, Address::new(bytes));
                return;
            }
        }
        self.records
            .write()
            .coin_addrs
            .insert((*node, coin_key(coin_type)), address);
    }

    pub fn set_text(&self, node: &NodeId, key: &str, value: &str) {
        self.records
            .write()
            .texts
            .insert((*node, key.to_string()), value.to_string());
    }

    pub fn set_name(&self, node: &NodeId, name: &str) {
        self.records.write().names.insert(*node, name.to_string());
    }

    pub fn supports_interface(interface: &Selector) -> bool {
        [
            *selectors::SUPPORTS_INTERFACE,
            *selectors::ADDR,
            *selectors::ADDR_MULTICOIN,
            *selectors::TEXT,
            *selectors::NAME,
            *selectors::RESOLVE,
        ]
        .contains(interface)
    }

    fn args(selector: &Selector, types: &[ParamType], data: &[u8]) -> Result<Vec<Token>, CallError> {
        unires_abi::decode_call(selector, types, data).map_err(|_| revert())
    }

    fn node_arg(tokens: &mut std::vec::IntoIter<Token>) -> Result<NodeId, CallError> {
        tokens.next().and_then(Token::into_node).ok_or_else(revert)
    }

    fn addr(&self, data: &[u8]) -> Result<Vec<u8>, CallError> {
        let mut args = Self::args(&selectors::ADDR, &[ParamType::FixedBytes(32)], data)?.into_iter();
        let node = Self::node_arg(&mut args)?;
        let address = self.records.read().addrs.get(&node).copied().unwrap_or_default();
        Ok(unires_abi::encode(&[Token::Address(address)]))
    }

    fn addr_for_coin(&self, data: &[u8]) -> Result<Vec<u8>, CallError> {
        let mut args = Self::args(
            &selectors::ADDR_MULTICOIN,
            &[ParamType::FixedBytes(32), ParamType::Uint],
            data,
        )?
        .into_iter();
        let node = Self::node_arg(&mut args)?;
        let coin = args.next().and_then(Token::into_uint).ok_or_else(revert)?;
        let records = self.records.read();
        let value = if coin == coin_key(COIN_TYPE_NATIVE) {
            records
                .addrs
                .get(&node)
                .map(|a| a.as_bytes().to_vec())
                .unwrap_or_default()
        } else {
            records.coin_addrs.get(&(node, coin)).cloned().unwrap_or_default()
        };
        Ok(unires_abi::encode(&[Token::Bytes(value)]))
    }

    fn text(&self, data: &[u8]) -> Result<Vec<u8>, CallError> {
        let mut args = Self::args(
            &selectors::TEXT,
            &[ParamType::FixedBytes(32), ParamType::String],
            data,
        )?
        .into_iter();
        let node = Self::node_arg(&mut args)?;
        let key = args.next().and_then(Token::into_string).ok_or_else(revert)?;
        let value = self
            .records
            .read()
            .texts
            .get(&(node, key))
            .cloned()
            .unwrap_or_default();
        Ok(unires_abi::encode(&[Token::String(value)]))
    }

    fn name(&self, data: &[u8]) -> Result<Vec<u8>, CallError> {
        let mut args = Self::args(&selectors::NAME, &[ParamType::FixedBytes(32)], data)?.into_iter();
        let node = Self::node_arg(&mut args)?;
        let name = self.records.read().names.get(&node).cloned().unwrap_or_default();
        Ok(unires_abi::encode(&[Token::String(name)]))
    }

    fn resolve(&self, data: &[u8]) -> Result<Vec<u8>, CallError> {
        let mut args = Self::args(&selectors::RESOLVE, &[ParamType::Bytes, ParamType::Bytes], data)?
            .into_iter();
        let _name = args.next();
        let inner = args.next().and_then(Token::into_bytes).ok_or_else(revert)?;
        let answer = self.call(&inner)?;
        Ok(unires_abi::encode(&[Token::Bytes(answer)]))
    }
}

impl Resolver for RecordResolver {
    fn call(&self, data: &[u8]) -> Result<Vec<u8>, CallError> {
        if data.len() < 4 {
            return Err(revert());
        }
        let selector = Selector::of(data);
        if selector == *selectors::ADDR {
            self.addr(data)
        } else if selector == *selectors::ADDR_MULTICOIN {
            self.addr_for_coin(data)
        } else if selector == *selectors::TEXT {
            self.text(data)
        } else if selector == *selectors::NAME {
            self.name(data)
        } else if selector == *selectors::RESOLVE {
            self.resolve(data)
        } else if selector == *selectors::SUPPORTS_INTERFACE {
            let mut args =
                Self::args(&selectors::SUPPORTS_INTERFACE, &[ParamType::FixedBytes(4)], data)?
                    .into_iter();
            let interface = args.next().and_then(Token::into_selector).ok_or_else(revert)?;
            Ok(unires_abi::encode(&[Token::Bool(Self::supports_interface(
                &interface,
            ))]))
        } else {
            Err(revert())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use unires_names::namehash;

    #[test]
    fn answers_text_and_addr() {
        let node = namehash("test.astra").unwrap();
        let resolver = RecordResolver::new();
        resolver.set_text(&node, "foo", "bar");
        resolver.set_addr(&node, Address::repeat_byte(0x11));

        let text = resolver
            .call(&unires_abi::encode_call(
                &selectors::TEXT,
                &[Token::node(&node), Token::String("foo".into())],
            ))
            .unwrap();
        assert_eq!(text, unires_abi::encode(&[Token::String("bar".into())]));

        let addr = resolver
            .call(&unires_abi::encode_call(&selectors::ADDR, &[Token::node(&node)]))
            .unwrap();
        assert_eq!(addr, unires_abi::encode(&[Token::Address(Address::repeat_byte(0x11))]));
    }

    #[test]
    fn native_coin_shares_addr_record() {
        let node = namehash("test.astra").unwrap();
        let resolver = RecordResolver::new();
        resolver.set_addr_for_coin(&node, COIN_TYPE_NATIVE, vec![0x22; 20]);
        resolver.set_addr_for_coin(&node, 0, vec![0x76, 0xa9]);

        let native = resolver
            .call(&unires_abi::encode_call(
                &selectors::ADDR_MULTICOIN,
                &[Token::node(&node), Token::uint(COIN_TYPE_NATIVE)],
            ))
            .unwrap();
        assert_eq!(native, unires_abi::encode(&[Token::Bytes(vec![0x22; 20])]));

        let bitcoin = resolver
            .call(&unires_abi::encode_call(
                &selectors::ADDR_MULTICOIN,
                &[Token::node(&node), Token::uint(0)],
            ))
            .unwrap();
        assert_eq!(bitcoin, unires_abi::encode(&[Token::Bytes(vec![0x76, 0xa9])]));
    }

    #[test]
    fn extended_call_wraps_inner_answer() {
        let node = namehash("test.astra").unwrap();
        let resolver = RecordResolver::new();
        resolver.set_name(&node, "test.astra");
        let inner = unires_abi::encode_call(&selectors::NAME, &[Token::node(&node)]);
        let wrapped = resolver
            .call(&unires_abi::encode_call(
                &selectors::RESOLVE,
                &[
                    Token::Bytes(unires_names::encode("test.astra").unwrap()),
                    Token::Bytes(inner.clone()),
                ],
            ))
            .unwrap();
        assert_eq!(
            wrapped,
            unires_abi::encode(&[Token::Bytes(resolver.call(&inner).unwrap())])
        );
    }

    #[test]
    fn unknown_selector_reverts_empty() {
        let resolver = RecordResolver::new();
        assert_eq!(
            resolver.call(&[0xde, 0xad, 0xbe, 0xef]),
            Err(CallError::Revert(Vec::new()))
        );
        assert!(RecordResolver::supports_interface(&selectors::RESOLVE));
        assert!(!RecordResolver::supports_interface(&Selector::ZERO));
    }
}
