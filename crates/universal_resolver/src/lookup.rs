//! Off-store lookup signal and continuation token
//!
//! Both are bit-exact ABI payloads: the signal is the revert data of
//! `OffchainLookup(address,string[],bytes,bytes4,bytes)` and the token is the
//! `extraData` it carries back to the resume entry point.

use serde::{Deserialize, Serialize};
use unires_abi::{AbiError, ParamType, Token};
use unires_types::{selectors, Address, Selector};

fn lookup_types() -> Vec<ParamType> {
    vec![
        ParamType::Address,
        ParamType::array(ParamType::String),
        ParamType::Bytes,
        ParamType::FixedBytes(4),
        ParamType::Bytes,
    ]
}

fn token_types() -> Vec<ParamType> {
    vec![
        ParamType::Address,
        ParamType::array(ParamType::String),
        ParamType::Bytes,
        ParamType::array(ParamType::Tuple(vec![
            ParamType::FixedBytes(4),
            ParamType::Bytes,
        ])),
    ]
}

fn invalid(kind: &'static str) -> AbiError {
    AbiError::InvalidValue { kind }
}

/// Suspend signal asking the caller to fetch data from a gateway and
/// re-enter through `callback` with the response and `extra_data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffchainLookup {
    pub sender: Address,
    pub urls: Vec<String>,
    pub call_data: Vec<u8>,
    pub callback: Selector,
    pub extra_data: Vec<u8>,
}

impl OffchainLookup {
    /// Whether `data` carries the lookup selector.
    pub fn matches(data: &[u8]) -> bool {
        data.len() >= 4 && Selector::of(data) == *selectors::OFFCHAIN_LOOKUP
    }

    pub fn encode(&self) -> Vec<u8> {
        unires_abi::encode_call(
            &selectors::OFFCHAIN_LOOKUP,
            &[
                Token::Address(self.sender),
                Token::strings(&self.urls),
                Token::Bytes(self.call_data.clone()),
                Token::selector(&self.callback),
                Token::Bytes(self.extra_data.clone()),
            ],
        )
    }

    pub fn decode(data: &[u8]) -> Result<OffchainLookup, AbiError> {
        let mut tokens =
            unires_abi::decode_call(&selectors::OFFCHAIN_LOOKUP, &lookup_types(), data)?
                .into_iter();
        let mut next = || tokens.next().ok_or_else(|| invalid("OffchainLookup"));
        Ok(OffchainLookup {
            sender: next()?.into_address().ok_or_else(|| invalid("sender"))?,
            urls: next()?.into_strings().ok_or_else(|| invalid("urls"))?,
            call_data: next()?.into_bytes().ok_or_else(|| invalid("callData"))?,
            callback: next()?.into_selector().ok_or_else(|| invalid("callbackFunction"))?,
            extra_data: next()?.into_bytes().ok_or_else(|| invalid("extraData"))?,
        })
    }
}

/// How to resume one slot: a zero selector re-runs `data` directly,
/// anything else is the resolver's own callback with `data` as its extra data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotContinuation {
    pub callback: Selector,
    pub data: Vec<u8>,
}

impl SlotContinuation {
    pub fn direct(data: Vec<u8>) -> Self {
        Self {
            callback: Selector::ZERO,
            data,
        }
    }

    pub fn pending(callback: Selector, data: Vec<u8>) -> Self {
        Self { callback, data }
    }

    pub fn is_pending(&self) -> bool {
        !self.callback.is_zero()
    }
}

/// State carried across a suspension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationToken {
    pub resolver: Address,
    pub urls: Vec<String>,
    pub metadata: Vec<u8>,
    pub slots: Vec<SlotContinuation>,
}

impl ContinuationToken {
    pub fn pending_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_pending()).count()
    }

    pub fn encode(&self) -> Vec<u8> {
        let slots = self
            .slots
            .iter()
            .map(|slot| {
                Token::Tuple(vec![
                    Token::selector(&slot.callback),
                    Token::Bytes(slot.data.clone()),
                ])
            })
            .collect();
        unires_abi::encode(&[
            Token::Address(self.resolver),
            Token::strings(&self.urls),
            Token::Bytes(self.metadata.clone()),
            Token::Array(slots),
        ])
    }

    pub fn decode(data: &[u8]) -> Result<ContinuationToken, AbiError> {
        let mut tokens = unires_abi::decode(&token_types(), data)?.into_iter();
        let mut next = || tokens.next().ok_or_else(|| invalid("continuation token"));
        let resolver = next()?.into_address().ok_or_else(|| invalid("resolver"))?;
        let urls = next()?.into_strings().ok_or_else(|| invalid("urls"))?;
        let metadata = next()?.into_bytes().ok_or_else(|| invalid("metadata"))?;
        let slots = next()?
            .into_array()
            .ok_or_else(|| invalid("slots"))?
            .into_iter()
            .map(|slot| {
                let mut fields = slot.into_tuple().ok_or_else(|| invalid("slot"))?.into_iter();
                let callback = fields
                    .next()
                    .and_then(Token::into_selector)
                    .ok_or_else(|| invalid("slot callback"))?;
                let data = fields
                    .next()
                    .and_then(Token::into_bytes)
                    .ok_or_else(|| invalid("slot data"))?;
                Ok(SlotContinuation { callback, data })
            })
            .collect::<Result<Vec<_>, AbiError>>()?;
        Ok(ContinuationToken {
            resolver,
            urls,
            metadata,
            slots,
        })
    }
}

/// Reverse-resolution state that must survive the forward-step suspension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseMetadata {
    pub name: String,
    pub reverse_resolver: Address,
}

impl ReverseMetadata {
    pub fn encode(&self) -> Vec<u8> {
        unires_abi::encode(&[
            Token::String(self.name.clone()),
            Token::Address(self.reverse_resolver),
        ])
    }

    pub fn decode(data: &[u8]) -> Result<ReverseMetadata, AbiError> {
        let mut tokens =
            unires_abi::decode(&[ParamType::String, ParamType::Address], data)?.into_iter();
        let name = tokens
            .next()
            .and_then(Token::into_string)
            .ok_or_else(|| invalid("metadata name"))?;
        let reverse_resolver = tokens
            .next()
            .and_then(Token::into_address)
            .ok_or_else(|| invalid("metadata resolver"))?;
        Ok(ReverseMetadata {
            name,
            reverse_resolver,
        })
    }
}
