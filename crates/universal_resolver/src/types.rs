//! Types for universal resolution
//!
//! Per-slot outcomes, the aggregated results handed back to callers and the
//! two-way [`Resolution`] that either completes or suspends.

use crate::lookup::OffchainLookup;
use serde::{Deserialize, Serialize};
use unires_types::{selectors, Address, Selector};

/// Outcome of one query slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionResult {
    /// The resolver answered with data
    Value(Vec<u8>),
    /// No resolver, no data, or a failed call, callback or gateway request
    Empty,
    /// The slot was rejected outright; carries no value
    Error(SlotError),
}

/// Why a single slot was rejected rather than left empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotError {
    /// An off-store lookup was raised on behalf of another contract
    SenderMismatch { expected: Address, found: Address },
}

impl ResolutionResult {
    pub fn value(&self) -> Option<&[u8]> {
        match self {
            ResolutionResult::Value(data) => Some(data),
            _ => None,
        }
    }

    pub fn has_value(&self) -> bool {
        matches!(self, ResolutionResult::Value(_))
    }

    /// Result bytes as they appear in a result list: empty unless a value.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            ResolutionResult::Value(data) => data,
            _ => Vec::new(),
        }
    }
}

/// Result of a single-record resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleResolution {
    pub result: ResolutionResult,
    /// Resolver that answered (zero if none was found)
    pub resolver: Address,
}

impl SingleResolution {
    pub fn data(&self) -> &[u8] {
        self.result.value().unwrap_or_default()
    }
}

/// Results of a batched resolution, aligned with the submitted queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResolution {
    pub results: Vec<ResolutionResult>,
    pub resolver: Address,
}

/// Outcome of reverse resolution. Forward/reverse mismatch checks are left
/// to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseRecord {
    /// Name claimed by the reverse record (empty if none)
    pub name: String,
    /// Address the claimed name resolves to
    pub address: Address,
    /// Resolver that answered the reverse lookup
    pub reverse_resolver: Address,
    /// Resolver that answered the forward lookup
    pub resolver: Address,
}

/// Either a final value or a suspend signal the caller must satisfy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    Complete(T),
    Suspended(OffchainLookup),
}

impl<T> Resolution<T> {
    pub fn is_suspended(&self) -> bool {
        matches!(self, Resolution::Suspended(_))
    }

    pub fn complete(self) -> Option<T> {
        match self {
            Resolution::Complete(value) => Some(value),
            Resolution::Suspended(_) => None,
        }
    }

    pub fn suspended(self) -> Option<OffchainLookup> {
        match self {
            Resolution::Complete(_) => None,
            Resolution::Suspended(lookup) => Some(lookup),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolution<U> {
        match self {
            Resolution::Complete(value) => Resolution::Complete(f(value)),
            Resolution::Suspended(lookup) => Resolution::Suspended(lookup),
        }
    }
}

/// Resume entry point named by a suspend signal's callback selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CallbackKind {
    /// `resolveSingleCallback(bytes,bytes)`
    ResolveSingle,
    /// `resolveCallback(bytes,bytes)`
    ResolveBatch,
    /// `reverseCallback(bytes,bytes)`
    Reverse,
}

impl CallbackKind {
    pub fn selector(&self) -> Selector {
        match self {
            CallbackKind::ResolveSingle => *selectors::RESOLVE_SINGLE_CALLBACK,
            CallbackKind::ResolveBatch => *selectors::RESOLVE_CALLBACK,
            CallbackKind::Reverse => *selectors::REVERSE_CALLBACK,
        }
    }

    pub fn from_selector(selector: &Selector) -> Option<CallbackKind> {
        [
            CallbackKind::ResolveSingle,
            CallbackKind::ResolveBatch,
            CallbackKind::Reverse,
        ]
        .into_iter()
        .find(|kind| &kind.selector() == selector)
    }
}

/// Final value of a resumed resolution, tagged by entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resumed {
    Single(SingleResolution),
    Batch(BatchResolution),
    Reverse(ReverseRecord),
}
