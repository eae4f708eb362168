//! Shared fixtures: a small name hierarchy, a public record resolver, a
//! legacy resolver and an off-store resolver that always defers to a gateway.

#![allow(dead_code)]

use std::sync::Arc;
use unires_abi::{ParamType, Token};
use unires_names::Name;
use unires_registry::InMemoryRegistry;
use unires_types::{selectors, Address, NodeId, Selector};
use unires_universal_resolver::{
    CallError, InMemoryDirectory, LocalGateway, OffchainLookup, OffchainServer, RecordResolver,
    Resolver, ResolverConfig, UniversalResolver,
};

pub const OWNER: Address = Address::repeat_byte(0x01);
pub const ACCOUNT1: Address = Address::repeat_byte(0x02);
pub const UNIVERSAL: Address = Address::repeat_byte(0x55);
pub const PUBLIC_RESOLVER: Address = Address::repeat_byte(0xa1);
pub const LEGACY_RESOLVER: Address = Address::repeat_byte(0xa2);
pub const OFFCHAIN_RESOLVER: Address = Address::repeat_byte(0xa3);

pub const BATCH_GATEWAY: &str = "http://universal-offchain-resolver.local/";
pub const RESOLVER_URL: &str = "https://example.com/";

/// Query the off-store fixture answers without a gateway.
pub const ONCHAIN_SELECTOR: Selector = Selector([0x12, 0x34, 0x56, 0x78]);

pub fn name(dotted: &str) -> Name {
    Name::parse(dotted).unwrap()
}

pub fn node(dotted: &str) -> NodeId {
    name(dotted).namehash()
}

pub fn addr_query(dotted: &str) -> Vec<u8> {
    unires_abi::encode_call(&selectors::ADDR, &[Token::node(&node(dotted))])
}

pub fn addr_coin_query(dotted: &str, coin: u64) -> Vec<u8> {
    unires_abi::encode_call(
        &selectors::ADDR_MULTICOIN,
        &[Token::node(&node(dotted)), Token::uint(coin)],
    )
}

pub fn text_query(dotted: &str, key: &str) -> Vec<u8> {
    unires_abi::encode_call(
        &selectors::TEXT,
        &[Token::node(&node(dotted)), Token::String(key.to_string())],
    )
}

pub fn wrap_bytes(data: Vec<u8>) -> Vec<u8> {
    unires_abi::encode(&[Token::Bytes(data)])
}

pub fn decode_address(data: &[u8]) -> Address {
    unires_abi::decode(&[ParamType::Address], data)
        .unwrap()
        .pop()
        .and_then(Token::into_address)
        .unwrap()
}

pub fn decode_string(data: &[u8]) -> String {
    unires_abi::decode(&[ParamType::String], data)
        .unwrap()
        .pop()
        .and_then(Token::into_string)
        .unwrap()
}

/// Resolver that only knows `addr(bytes32)` and reverts on the capability probe.
pub struct LegacyResolver;

impl Resolver for LegacyResolver {
    fn call(&self, data: &[u8]) -> Result<Vec<u8>, CallError> {
        if Selector::of(data) == *selectors::ADDR {
            return Ok(unires_abi::encode(&[Token::Address(LEGACY_RESOLVER)]));
        }
        Err(CallError::Revert(Vec::new()))
    }
}

/// Extended resolver that answers every query through a gateway, except
/// [`ONCHAIN_SELECTOR`] which it answers directly. Its callback requires
/// the gateway to echo the lookup call data.
pub struct OffchainEchoResolver;

impl OffchainEchoResolver {
    fn answer(value: Token) -> Vec<u8> {
        wrap_bytes(unires_abi::encode(&[value]))
    }
}

impl Resolver for OffchainEchoResolver {
    fn call(&self, data: &[u8]) -> Result<Vec<u8>, CallError> {
        let selector = Selector::of(data);
        if selector == *selectors::SUPPORTS_INTERFACE {
            let interface = unires_abi::decode_call(&selector, &[ParamType::FixedBytes(4)], data)
                .ok()
                .and_then(|mut t| t.pop())
                .and_then(Token::into_selector);
            let supported = interface == Some(*selectors::RESOLVE)
                || interface == Some(*selectors::SUPPORTS_INTERFACE);
            Ok(unires_abi::encode(&[Token::Bool(supported)]))
        } else if selector == *selectors::RESOLVE {
            let mut args = unires_abi::decode_call(
                &selector,
                &[ParamType::Bytes, ParamType::Bytes],
                data,
            )
            .map_err(|_| CallError::Revert(Vec::new()))?;
            let inner = args
                .pop()
                .and_then(Token::into_bytes)
                .ok_or(CallError::Revert(Vec::new()))?;
            if Selector::of(&inner) == ONCHAIN_SELECTOR {
                return Ok(Self::answer(Token::String("foo".into())));
            }
            Err(CallError::Revert(
                OffchainLookup {
                    sender: OFFCHAIN_RESOLVER,
                    urls: vec![RESOLVER_URL.to_string()],
                    call_data: inner.clone(),
                    callback: *selectors::RESOLVE_CALLBACK,
                    extra_data: inner,
                }
                .encode(),
            ))
        } else if selector == ONCHAIN_SELECTOR {
            Ok(Self::answer(Token::String("foo".into())))
        } else if selector == *selectors::ADDR {
            Ok(Self::answer(Token::String("onchain".into())))
        } else if selector == *selectors::RESOLVE_CALLBACK {
            let mut args = unires_abi::decode_call(
                &selector,
                &[ParamType::Bytes, ParamType::Bytes],
                data,
            )
            .map_err(|_| CallError::Revert(Vec::new()))?
            .into_iter();
            let response = args.next().and_then(Token::into_bytes);
            let extra = args.next().and_then(Token::into_bytes);
            if response.is_none() || response != extra {
                return Err(CallError::Revert(Vec::new()));
            }
            let extra = extra.unwrap_or_default();
            if Selector::of(&extra) == *selectors::NAME {
                Ok(Self::answer(Token::String("offchain.test.astra".into())))
            } else {
                Ok(Self::answer(Token::Address(OFFCHAIN_RESOLVER)))
            }
        } else {
            Err(CallError::Revert(Vec::new()))
        }
    }
}

/// Gateway-side data source that echoes the lookup call data.
pub struct EchoServer;

impl OffchainServer for EchoServer {
    fn serve(&self, call_data: &[u8]) -> Result<Vec<u8>, Vec<u8>> {
        Ok(call_data.to_vec())
    }
}

pub struct Fixture {
    pub registry: Arc<InMemoryRegistry>,
    pub directory: Arc<InMemoryDirectory>,
    pub public_resolver: Arc<RecordResolver>,
    pub universal: Arc<UniversalResolver>,
    pub gateway: LocalGateway,
}

impl Fixture {
    /// Create `dotted` owned by [`OWNER`], creating parents as needed.
    pub fn register(&self, dotted: &str) -> NodeId {
        let mut current = NodeId::ROOT;
        for label in name(dotted).labels().iter().rev() {
            current = self
                .registry
                .set_subnode_owner(OWNER, &current, &label.labelhash(), OWNER)
                .unwrap();
        }
        current
    }

    pub fn set_resolver(&self, dotted: &str, resolver: Address) {
        let node = self.register(dotted);
        self.registry.set_resolver(OWNER, &node, resolver).unwrap();
    }
}

/// Hierarchy used across the suite:
/// - `test.astra` → public resolver with `addr = ACCOUNT1`, `text(foo) = bar`
/// - `sub.test.astra` → `ACCOUNT1` (nothing deployed there)
/// - `offchain.test.astra` → off-store resolver
/// - `<OWNER>.addr.reverse` → public resolver with `name = test.astra`
pub fn setup() -> Fixture {
    let registry = Arc::new(InMemoryRegistry::new(OWNER));
    let directory = Arc::new(InMemoryDirectory::new());
    let public_resolver = Arc::new(RecordResolver::new());
    directory.deploy(PUBLIC_RESOLVER, public_resolver.clone());
    directory.deploy(LEGACY_RESOLVER, Arc::new(LegacyResolver));
    directory.deploy(OFFCHAIN_RESOLVER, Arc::new(OffchainEchoResolver));

    let config = ResolverConfig {
        address: UNIVERSAL,
        batch_gateway_urls: vec![BATCH_GATEWAY.to_string()],
        ..ResolverConfig::default()
    };
    let universal = Arc::new(UniversalResolver::new(
        config,
        registry.clone(),
        directory.clone(),
    ));
    let gateway = LocalGateway::new();
    gateway.register(OFFCHAIN_RESOLVER, Arc::new(EchoServer));

    let fixture = Fixture {
        registry,
        directory,
        public_resolver,
        universal,
        gateway,
    };

    fixture.set_resolver("test.astra", PUBLIC_RESOLVER);
    fixture.set_resolver("sub.test.astra", ACCOUNT1);
    fixture.set_resolver("offchain.test.astra", OFFCHAIN_RESOLVER);

    let test_node = node("test.astra");
    fixture.public_resolver.set_addr(&test_node, ACCOUNT1);
    fixture.public_resolver.set_text(&test_node, "foo", "bar");

    let reverse = Name::reverse(&OWNER, "addr.reverse").unwrap();
    fixture.set_resolver(&reverse.to_string(), PUBLIC_RESOLVER);
    fixture
        .public_resolver
        .set_name(&reverse.namehash(), "test.astra");

    fixture
}
