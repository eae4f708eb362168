//! Universal resolver implementation
//!
//! Entry points either complete with a value or suspend with an
//! [`OffchainLookup`] carrying a [`ContinuationToken`]. The resolver keeps no
//! state between a suspension and its resume: everything needed travels in
//! the token.

use crate::config::ResolverConfig;
use crate::contract::{Capability, ResolverDirectory};
use crate::discovery::{find_resolver, ResolverMatch};
use crate::dispatch::{Dispatched, Dispatcher, SlotInput};
use crate::errors::*;
use crate::gateway::{decode_replies, encode_query, GatewayReply};
use crate::lookup::{ContinuationToken, OffchainLookup, ReverseMetadata};
use crate::types::*;
use std::sync::Arc;
use tracing::{debug, info, warn};
use unires_abi::{ParamType, Token};
use unires_names::Name;
use unires_registry::Registry;
use unires_types::{selectors, Address, Selector};

/// Results of one dispatch or resume pass before they are shaped for an
/// entry point.
struct Pass {
    results: Vec<ResolutionResult>,
    resolver: Address,
    metadata: Vec<u8>,
    urls: Vec<String>,
}

impl Pass {
    fn first(self) -> ResolutionResult {
        self.results
            .into_iter()
            .next()
            .unwrap_or(ResolutionResult::Empty)
    }
}

/// Resolves names through the registry, one resolver per name.
pub struct UniversalResolver {
    config: ResolverConfig,
    registry: Arc<dyn Registry>,
    directory: Arc<dyn ResolverDirectory>,
}

impl UniversalResolver {
    pub fn new(
        config: ResolverConfig,
        registry: Arc<dyn Registry>,
        directory: Arc<dyn ResolverDirectory>,
    ) -> Self {
        Self {
            config,
            registry,
            directory,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Address this resolver reports as the sender of suspend signals.
    pub fn address(&self) -> Address {
        self.config.address
    }

    /// Closest-to-leaf resolver for `name`.
    pub fn find_resolver(&self, name: &Name) -> ResolverMatch {
        find_resolver(self.registry.as_ref(), name)
    }

    /// Resolve one record of `name` using the configured gateways.
    pub fn resolve(&self, name: &Name, query: &[u8]) -> Result<Resolution<SingleResolution>> {
        self.resolve_with_gateways(name, query, &self.config.batch_gateway_urls)
    }

    /// Resolve one record of `name`, suspending towards `gateways` if needed.
    pub fn resolve_with_gateways(
        &self,
        name: &Name,
        query: &[u8],
        gateways: &[String],
    ) -> Result<Resolution<SingleResolution>> {
        let pass = self.dispatch(
            name,
            &[query.to_vec()],
            gateways,
            CallbackKind::ResolveSingle,
            Vec::new(),
        )?;
        Ok(pass.map(|pass| {
            let resolver = pass.resolver;
            SingleResolution {
                result: pass.first(),
                resolver,
            }
        }))
    }

    /// Resolve several records of `name` with one discovery.
    pub fn resolve_batch(
        &self,
        name: &Name,
        queries: &[Vec<u8>],
    ) -> Result<Resolution<BatchResolution>> {
        self.resolve_batch_with_gateways(name, queries, &self.config.batch_gateway_urls)
    }

    pub fn resolve_batch_with_gateways(
        &self,
        name: &Name,
        queries: &[Vec<u8>],
        gateways: &[String],
    ) -> Result<Resolution<BatchResolution>> {
        let pass = self.dispatch(name, queries, gateways, CallbackKind::ResolveBatch, Vec::new())?;
        Ok(pass.map(|pass| BatchResolution {
            results: pass.results,
            resolver: pass.resolver,
        }))
    }

    /// Resume a suspended single resolution with the gateway `response`.
    pub fn resume_single(
        &self,
        response: &[u8],
        extra_data: &[u8],
    ) -> Result<Resolution<SingleResolution>> {
        let token = decode_token(extra_data)?;
        let pass = self.resume(response, token, CallbackKind::ResolveSingle)?;
        Ok(pass.map(|pass| {
            let resolver = pass.resolver;
            SingleResolution {
                result: pass.first(),
                resolver,
            }
        }))
    }

    /// Resume a suspended batch resolution with the gateway `response`.
    pub fn resume_batch(
        &self,
        response: &[u8],
        extra_data: &[u8],
    ) -> Result<Resolution<BatchResolution>> {
        let token = decode_token(extra_data)?;
        let pass = self.resume(response, token, CallbackKind::ResolveBatch)?;
        Ok(pass.map(|pass| BatchResolution {
            results: pass.results,
            resolver: pass.resolver,
        }))
    }

    /// Reverse-resolve `reverse_name` (for example `<hex>.addr.reverse`)
    /// and forward-resolve the claimed name's address.
    pub fn reverse(&self, reverse_name: &Name) -> Result<Resolution<ReverseRecord>> {
        self.reverse_with_gateways(reverse_name, &self.config.batch_gateway_urls)
    }

    pub fn reverse_with_gateways(
        &self,
        reverse_name: &Name,
        gateways: &[String],
    ) -> Result<Resolution<ReverseRecord>> {
        let query = unires_abi::encode_call(
            &selectors::NAME,
            &[Token::node(&reverse_name.namehash())],
        );
        match self.dispatch(reverse_name, &[query], gateways, CallbackKind::Reverse, Vec::new())? {
            Resolution::Complete(pass) => {
                let reverse_resolver = pass.resolver;
                self.forward(pass.first(), reverse_resolver, gateways)
            }
            Resolution::Suspended(lookup) => Ok(Resolution::Suspended(lookup)),
        }
    }

    /// Reverse-resolve `address` under the configured reverse suffix.
    pub fn reverse_address(&self, address: &Address) -> Result<Resolution<ReverseRecord>> {
        let name = Name::reverse(address, &self.config.reverse_suffix)?;
        self.reverse(&name)
    }

    /// Resume a suspended reverse resolution. Without metadata the token
    /// belongs to the reverse step and the forward step still has to run;
    /// with metadata it belongs to the forward step.
    pub fn reverse_callback(
        &self,
        response: &[u8],
        extra_data: &[u8],
    ) -> Result<Resolution<ReverseRecord>> {
        let token = decode_token(extra_data)?;
        let pass = match self.resume(response, token, CallbackKind::Reverse)? {
            Resolution::Complete(pass) => pass,
            Resolution::Suspended(lookup) => return Ok(Resolution::Suspended(lookup)),
        };

        if pass.metadata.is_empty() {
            let reverse_resolver = pass.resolver;
            let urls = pass.urls.clone();
            return self.forward(pass.first(), reverse_resolver, &urls);
        }

        let metadata =
            ReverseMetadata::decode(&pass.metadata).map_err(ResolveError::InvalidContinuation)?;
        let resolver = pass.resolver;
        let address = decode_address(pass.first())?;
        Ok(Resolution::Complete(ReverseRecord {
            name: metadata.name,
            address,
            reverse_resolver: metadata.reverse_resolver,
            resolver,
        }))
    }

    /// Route a resume to the entry point named by `callback`.
    pub fn handle_callback(
        &self,
        callback: &Selector,
        response: &[u8],
        extra_data: &[u8],
    ) -> Result<Resolution<Resumed>> {
        match CallbackKind::from_selector(callback) {
            Some(CallbackKind::ResolveSingle) => Ok(self
                .resume_single(response, extra_data)?
                .map(Resumed::Single)),
            Some(CallbackKind::ResolveBatch) => Ok(self
                .resume_batch(response, extra_data)?
                .map(Resumed::Batch)),
            Some(CallbackKind::Reverse) => Ok(self
                .reverse_callback(response, extra_data)?
                .map(Resumed::Reverse)),
            None => Err(ResolveError::UnknownCallback(*callback)),
        }
    }

    /// Forward step of reverse resolution.
    fn forward(
        &self,
        claimed: ResolutionResult,
        reverse_resolver: Address,
        gateways: &[String],
    ) -> Result<Resolution<ReverseRecord>> {
        let claimed = decode_string(claimed)?;
        if claimed.is_empty() {
            debug!(%reverse_resolver, "no reverse record");
            return Ok(Resolution::Complete(ReverseRecord {
                name: String::new(),
                address: Address::ZERO,
                reverse_resolver,
                resolver: Address::ZERO,
            }));
        }

        let name = Name::parse(&claimed)?;
        let query =
            unires_abi::encode_call(&selectors::ADDR, &[Token::node(&name.namehash())]);
        let metadata = ReverseMetadata {
            name: claimed.clone(),
            reverse_resolver,
        }
        .encode();
        match self.dispatch(&name, &[query], gateways, CallbackKind::Reverse, metadata)? {
            Resolution::Complete(pass) => {
                let resolver = pass.resolver;
                let address = decode_address(pass.first())?;
                Ok(Resolution::Complete(ReverseRecord {
                    name: claimed,
                    address,
                    reverse_resolver,
                    resolver,
                }))
            }
            Resolution::Suspended(lookup) => Ok(Resolution::Suspended(lookup)),
        }
    }

    fn dispatch(
        &self,
        name: &Name,
        queries: &[Vec<u8>],
        gateways: &[String],
        callback: CallbackKind,
        metadata: Vec<u8>,
    ) -> Result<Resolution<Pass>> {
        let found = self.find_resolver(name);
        if !found.is_found() {
            return Ok(Resolution::Complete(Pass {
                results: vec![ResolutionResult::Empty; queries.len()],
                resolver: Address::ZERO,
                metadata,
                urls: gateways.to_vec(),
            }));
        }

        let capability = Capability::probe(self.directory.as_ref(), &found.resolver);
        let wire_name = name.to_wire();
        let inputs = queries
            .iter()
            .map(|query| SlotInput::Call {
                call_data: match capability {
                    Capability::Extended => unires_abi::encode_call(
                        &selectors::RESOLVE,
                        &[Token::Bytes(wire_name.clone()), Token::Bytes(query.clone())],
                    ),
                    Capability::LegacyOnly => query.clone(),
                },
                replay: query.clone(),
            })
            .collect();

        let token = ContinuationToken {
            resolver: found.resolver,
            urls: gateways.to_vec(),
            metadata,
            slots: Vec::new(),
        };
        Ok(self.finish(found.resolver, capability, inputs, token, callback))
    }

    fn resume(
        &self,
        response: &[u8],
        token: ContinuationToken,
        callback: CallbackKind,
    ) -> Result<Resolution<Pass>> {
        if token.slots.is_empty() {
            return Err(ResolveError::EmptyContinuation);
        }
        let replies = decode_replies(response).map_err(ResolveError::InvalidGatewayResponse)?;
        let pending = token.pending_count();
        if replies.len() > pending {
            return Err(ResolveError::ContinuationMismatch {
                responses: replies.len(),
                pending,
            });
        }

        let capability = Capability::probe(self.directory.as_ref(), &token.resolver);
        let dispatcher = Dispatcher {
            directory: self.directory.as_ref(),
            resolver: token.resolver,
            capability,
        };
        let mut replies = replies.into_iter();
        let inputs = token
            .slots
            .iter()
            .map(|slot| {
                if !slot.is_pending() {
                    return SlotInput::Call {
                        call_data: slot.data.clone(),
                        replay: slot.data.clone(),
                    };
                }
                match replies.next() {
                    None => {
                        debug!(resolver = %token.resolver, "no gateway response for slot");
                        SlotInput::Settled(ResolutionResult::Empty)
                    }
                    Some(GatewayReply { failed: true, data }) => {
                        if OffchainLookup::matches(&data) {
                            match dispatcher.classify_revert(data) {
                                Ok(lookup) => SlotInput::Lookup(lookup),
                                Err(result) => SlotInput::Settled(result),
                            }
                        } else {
                            if !data.is_empty() {
                                warn!(
                                    resolver = %token.resolver,
                                    reason = %hex::encode(&data),
                                    "gateway request failed"
                                );
                            }
                            SlotInput::Settled(ResolutionResult::Empty)
                        }
                    }
                    Some(GatewayReply { failed: false, data }) => {
                        let call_data = unires_abi::encode_call(
                            &slot.callback,
                            &[Token::Bytes(data), Token::Bytes(slot.data.clone())],
                        );
                        SlotInput::Call {
                            replay: call_data.clone(),
                            call_data,
                        }
                    }
                }
            })
            .collect();

        debug!(resolver = %token.resolver, slots = token.slots.len(), pending, "resuming");
        let resolver = token.resolver;
        let token = ContinuationToken {
            slots: Vec::new(),
            ..token
        };
        Ok(self.finish(resolver, capability, inputs, token, callback))
    }

    /// Run the slots and either complete or suspend with `token` filled in.
    fn finish(
        &self,
        resolver: Address,
        capability: Capability,
        inputs: Vec<SlotInput>,
        token: ContinuationToken,
        callback: CallbackKind,
    ) -> Resolution<Pass> {
        let dispatcher = Dispatcher {
            directory: self.directory.as_ref(),
            resolver,
            capability,
        };
        match dispatcher.run(inputs) {
            Dispatched::Complete(results) => Resolution::Complete(Pass {
                results,
                resolver,
                metadata: token.metadata,
                urls: token.urls,
            }),
            Dispatched::Suspended { requests, slots } => {
                info!(%resolver, requests = requests.len(), ?callback, "suspending for off-store lookup");
                let urls = token.urls.clone();
                let token = ContinuationToken { slots, ..token };
                Resolution::Suspended(OffchainLookup {
                    sender: self.config.address,
                    urls,
                    call_data: encode_query(&requests),
                    callback: callback.selector(),
                    extra_data: token.encode(),
                })
            }
        }
    }
}

fn decode_token(extra_data: &[u8]) -> Result<ContinuationToken> {
    ContinuationToken::decode(extra_data).map_err(ResolveError::InvalidContinuation)
}

fn decode_string(result: ResolutionResult) -> Result<String> {
    let data = result.into_bytes();
    if data.is_empty() {
        return Ok(String::new());
    }
    unires_abi::decode(&[ParamType::String], &data)
        .and_then(|tokens| {
            tokens
                .into_iter()
                .next()
                .and_then(Token::into_string)
                .ok_or(unires_abi::AbiError::InvalidValue { kind: "string" })
        })
        .map_err(|source| ResolveError::MalformedRecord {
            record: "name",
            source,
        })
}

fn decode_address(result: ResolutionResult) -> Result<Address> {
    let data = result.into_bytes();
    if data.is_empty() {
        return Ok(Address::ZERO);
    }
    unires_abi::decode(&[ParamType::Address], &data)
        .and_then(|tokens| {
            tokens
                .into_iter()
                .next()
                .and_then(Token::into_address)
                .ok_or(unires_abi::AbiError::InvalidValue { kind: "address" })
        })
        .map_err(|source| ResolveError::MalformedRecord {
            record: "addr",
            source,
        })
}
