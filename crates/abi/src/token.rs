//! Typed ABI values and their type descriptors.

use crate::WORD;
use unires_types::{Address, NodeId, Selector};

/// Type descriptor driving [`crate::decode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    Address,
    Bool,
    Uint,
    /// `bytesN` with `1 <= N <= 32`.
    FixedBytes(usize),
    Bytes,
    String,
    Array(Box<ParamType>),
    Tuple(Vec<ParamType>),
}

impl ParamType {
    pub fn array(inner: ParamType) -> ParamType {
        ParamType::Array(Box::new(inner))
    }

    pub fn is_dynamic(&self) -> bool {
        match self {
            ParamType::Bytes | ParamType::String | ParamType::Array(_) => true,
            ParamType::Tuple(inner) => inner.iter().any(ParamType::is_dynamic),
            _ => false,
        }
    }

    /// Bytes this type occupies in the head of an enclosing tuple.
    pub fn head_size(&self) -> usize {
        match self {
            ParamType::Tuple(inner) if !self.is_dynamic() => {
                inner.iter().map(ParamType::head_size).sum()
            }
            _ => WORD,
        }
    }
}

/// A decoded or to-be-encoded ABI value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Bool(bool),
    /// Big-endian 256-bit word.
    Uint([u8; WORD]),
    FixedBytes(Vec<u8>),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<Token>),
    Tuple(Vec<Token>),
}

impl Token {
    pub fn uint(value: u64) -> Token {
        let mut word = [0u8; WORD];
        word[WORD - 8..].copy_from_slice(&value.to_be_bytes());
        Token::Uint(word)
    }

    pub fn node(node: &NodeId) -> Token {
        Token::FixedBytes(node.as_bytes().to_vec())
    }

    pub fn selector(selector: &Selector) -> Token {
        Token::FixedBytes(selector.as_bytes().to_vec())
    }

    pub fn strings<S: AsRef<str>>(items: &[S]) -> Token {
        Token::Array(
            items
                .iter()
                .map(|s| Token::String(s.as_ref().to_string()))
                .collect(),
        )
    }

    pub fn is_dynamic(&self) -> bool {
        match self {
            Token::Bytes(_) | Token::String(_) | Token::Array(_) => true,
            Token::Tuple(inner) => inner.iter().any(Token::is_dynamic),
            _ => false,
        }
    }

    pub fn into_address(self) -> Option<Address> {
        match self {
            Token::Address(a) => Some(a),
            _ => None,
        }
    }

    pub fn into_bool(self) -> Option<bool> {
        match self {
            Token::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn into_uint(self) -> Option<[u8; WORD]> {
        match self {
            Token::Uint(w) => Some(w),
            _ => None,
        }
    }

    pub fn into_fixed_bytes(self) -> Option<Vec<u8>> {
        match self {
            Token::FixedBytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Token::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Token::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn into_array(self) -> Option<Vec<Token>> {
        match self {
            Token::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_tuple(self) -> Option<Vec<Token>> {
        match self {
            Token::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Interprets a `bytes32` token as a node identifier.
    pub fn into_node(self) -> Option<NodeId> {
        let bytes: [u8; 32] = self.into_fixed_bytes()?.try_into().ok()?;
        Some(NodeId(bytes))
    }

    /// Interprets a `bytes4` token as a selector.
    pub fn into_selector(self) -> Option<Selector> {
        let bytes: [u8; 4] = self.into_fixed_bytes()?.try_into().ok()?;
        Some(Selector(bytes))
    }

    /// Interprets a `string[]` token.
    pub fn into_strings(self) -> Option<Vec<String>> {
        self.into_array()?
            .into_iter()
            .map(Token::into_string)
            .collect()
    }
}
