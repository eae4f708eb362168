//! Per-slot dispatch against a single resolver
//!
//! Every slot is called and classified on its own, so one failing slot
//! never affects its siblings. Slots that raise a valid off-store lookup
//! are collected into one gateway batch and one continuation slot list.

use crate::contract::{CallError, Capability, ResolverDirectory};
use crate::gateway::GatewayRequest;
use crate::lookup::{OffchainLookup, SlotContinuation};
use crate::types::{ResolutionResult, SlotError};
use tracing::{debug, warn};
use unires_abi::{ParamType, Token};
use unires_types::Address;

/// Work item for one slot.
#[derive(Debug, Clone)]
pub(crate) enum SlotInput {
    /// Call the resolver with `call_data`. `replay` is what a later resume
    /// re-runs if this slot ends up alongside a suspension.
    Call { call_data: Vec<u8>, replay: Vec<u8> },
    /// Outcome already known without calling the resolver
    Settled(ResolutionResult),
    /// The slot must go back to the gateway
    Lookup(OffchainLookup),
}

enum SlotState {
    Done {
        result: ResolutionResult,
        replay: Vec<u8>,
    },
    Pending(OffchainLookup),
}

/// Result of running every slot once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Dispatched {
    Complete(Vec<ResolutionResult>),
    Suspended {
        requests: Vec<GatewayRequest>,
        slots: Vec<SlotContinuation>,
    },
}

/// Dispatcher bound to one resolver and its calling convention.
pub(crate) struct Dispatcher<'a> {
    pub directory: &'a dyn ResolverDirectory,
    pub resolver: Address,
    pub capability: Capability,
}

impl<'a> Dispatcher<'a> {
    pub fn run(&self, inputs: Vec<SlotInput>) -> Dispatched {
        let states: Vec<SlotState> = inputs
            .into_iter()
            .enumerate()
            .map(|(index, input)| match input {
                SlotInput::Call { call_data, replay } => self.call(index, &call_data, replay),
                SlotInput::Settled(result) => SlotState::Done {
                    result,
                    replay: Vec::new(),
                },
                SlotInput::Lookup(lookup) => SlotState::Pending(lookup),
            })
            .collect();

        if !states.iter().any(|s| matches!(s, SlotState::Pending(_))) {
            return Dispatched::Complete(
                states
                    .into_iter()
                    .map(|state| match state {
                        SlotState::Done { result, .. } => result,
                        SlotState::Pending(_) => ResolutionResult::Empty,
                    })
                    .collect(),
            );
        }

        let mut requests = Vec::new();
        let slots = states
            .into_iter()
            .map(|state| match state {
                SlotState::Done { replay, .. } => SlotContinuation::direct(replay),
                SlotState::Pending(lookup) => {
                    requests.push(GatewayRequest {
                        sender: lookup.sender,
                        urls: lookup.urls,
                        call_data: lookup.call_data,
                    });
                    SlotContinuation::pending(lookup.callback, lookup.extra_data)
                }
            })
            .collect();
        debug!(resolver = %self.resolver, pending = requests.len(), "slots pending off-store data");
        Dispatched::Suspended { requests, slots }
    }

    fn call(&self, index: usize, call_data: &[u8], replay: Vec<u8>) -> SlotState {
        match self.directory.call(&self.resolver, call_data) {
            Ok(data) => SlotState::Done {
                result: self.unwrap_return(index, data),
                replay,
            },
            Err(CallError::NoCode(_)) => SlotState::Done {
                result: ResolutionResult::Empty,
                replay,
            },
            Err(CallError::Revert(data)) => match self.classify_revert(data) {
                Ok(lookup) => SlotState::Pending(lookup),
                Err(result) => {
                    debug!(slot = index, resolver = %self.resolver, ?result, "slot failed");
                    SlotState::Done { result, replay }
                }
            },
        }
    }

    /// Extended resolvers return their answer as ABI `bytes`.
    fn unwrap_return(&self, index: usize, data: Vec<u8>) -> ResolutionResult {
        if data.is_empty() {
            return ResolutionResult::Empty;
        }
        if !self.capability.is_extended() {
            return ResolutionResult::Value(data);
        }
        match unires_abi::decode(&[ParamType::Bytes], &data)
            .map(|tokens| tokens.into_iter().next().and_then(Token::into_bytes))
        {
            Ok(Some(inner)) if inner.is_empty() => ResolutionResult::Empty,
            Ok(Some(inner)) => ResolutionResult::Value(inner),
            Ok(None) => {
                warn!(slot = index, resolver = %self.resolver, "result is not bytes");
                ResolutionResult::Empty
            }
            Err(err) => {
                warn!(slot = index, resolver = %self.resolver, %err, "undecodable result");
                ResolutionResult::Empty
            }
        }
    }

    /// Turns revert data into a pending lookup when it is a valid
    /// `OffchainLookup` raised by this resolver, or into a slot result.
    /// Any other revert leaves the slot empty.
    pub fn classify_revert(&self, data: Vec<u8>) -> Result<OffchainLookup, ResolutionResult> {
        if !OffchainLookup::matches(&data) {
            if !data.is_empty() {
                debug!(
                    resolver = %self.resolver,
                    reason = %hex::encode(&data),
                    "resolver reverted"
                );
            }
            return Err(ResolutionResult::Empty);
        }
        let lookup = OffchainLookup::decode(&data).map_err(|err| {
            warn!(resolver = %self.resolver, %err, "malformed off-store lookup");
            ResolutionResult::Empty
        })?;
        if lookup.sender != self.resolver {
            warn!(expected = %self.resolver, found = %lookup.sender, "lookup raised for another contract");
            return Err(ResolutionResult::Error(SlotError::SenderMismatch {
                expected: self.resolver,
                found: lookup.sender,
            }));
        }
        Ok(lookup)
    }
}
