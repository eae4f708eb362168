mod common;

use async_trait::async_trait;
use common::*;
use std::sync::Arc;
use std::time::Duration;
use unires_universal_resolver::{
    ClientConfig, ClientError, Gateway, GatewayError, LookupClient, ResolutionResult,
};

fn client(fixture: &Fixture, gateway: Arc<dyn Gateway>, config: ClientConfig) -> LookupClient {
    LookupClient::new(fixture.universal.clone(), gateway, config)
}

/// Gateway that never answers in time.
struct SlowGateway;

#[async_trait]
impl Gateway for SlowGateway {
    async fn query(&self, _urls: &[String], _call_data: &[u8]) -> Result<Vec<u8>, GatewayError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Vec::new())
    }
}

/// Gateway whose backend is down.
struct DownGateway;

#[async_trait]
impl Gateway for DownGateway {
    async fn query(&self, _urls: &[String], _call_data: &[u8]) -> Result<Vec<u8>, GatewayError> {
        Err(anyhow::anyhow!("connection refused").into())
    }
}

#[tokio::test]
async fn drives_single_lookup_to_completion() {
    let fixture = setup();
    let client = client(
        &fixture,
        Arc::new(fixture.gateway.clone()),
        ClientConfig::default(),
    );
    let single = client
        .resolve(&name("offchain.test.astra"), &addr_query("offchain.test.astra"))
        .await
        .unwrap();
    assert_eq!(single.resolver, OFFCHAIN_RESOLVER);
    assert_eq!(decode_address(single.data()), OFFCHAIN_RESOLVER);
}

#[tokio::test]
async fn drives_mixed_batch_in_slot_order() {
    let fixture = setup();
    let client = client(
        &fixture,
        Arc::new(fixture.gateway.clone()),
        ClientConfig::default(),
    );
    let onchain = unires_abi::encode_call(&ONCHAIN_SELECTOR, &[]);
    let batch = client
        .resolve_batch(
            &name("offchain.test.astra"),
            &[onchain, text_query("offchain.test.astra", "foo")],
        )
        .await
        .unwrap();
    assert_eq!(decode_string(batch.results[0].value().unwrap()), "foo");
    assert_eq!(decode_address(batch.results[1].value().unwrap()), OFFCHAIN_RESOLVER);
}

#[tokio::test]
async fn on_store_resolution_needs_no_gateway() {
    let fixture = setup();
    let client = client(&fixture, Arc::new(DownGateway), ClientConfig::default());
    let single = client
        .resolve(&name("test.astra"), &addr_query("test.astra"))
        .await
        .unwrap();
    assert_eq!(decode_address(single.data()), ACCOUNT1);
}

#[tokio::test]
async fn reverse_follows_both_suspensions() {
    let fixture = setup();
    let reverse_name = unires_names::Name::reverse(&ACCOUNT1, "addr.reverse").unwrap();
    fixture.set_resolver(&reverse_name.to_string(), OFFCHAIN_RESOLVER);
    let client = client(
        &fixture,
        Arc::new(fixture.gateway.clone()),
        ClientConfig::default(),
    );
    let record = client.reverse(&ACCOUNT1).await.unwrap();
    assert_eq!(record.name, "offchain.test.astra");
    assert_eq!(record.address, OFFCHAIN_RESOLVER);
    assert_eq!(record.reverse_resolver, OFFCHAIN_RESOLVER);
    assert_eq!(record.resolver, OFFCHAIN_RESOLVER);
}

#[tokio::test]
async fn stops_after_lookup_limit() {
    let fixture = setup();
    let client = client(
        &fixture,
        Arc::new(fixture.gateway.clone()),
        ClientConfig {
            max_lookups: 0,
            ..ClientConfig::default()
        },
    );
    let err = client
        .resolve(&name("offchain.test.astra"), &addr_query("offchain.test.astra"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::TooManyLookups { limit: 0 }));
}

#[tokio::test(start_paused = true)]
async fn times_out_slow_gateway() {
    let fixture = setup();
    let client = client(&fixture, Arc::new(SlowGateway), ClientConfig::default());
    let err = client
        .resolve(&name("offchain.test.astra"), &addr_query("offchain.test.astra"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Timeout { timeout_ms: 5_000 }));
}

#[test]
fn surfaces_gateway_backend_errors() {
    let fixture = setup();
    let client = client(&fixture, Arc::new(DownGateway), ClientConfig::default());
    let err = tokio_test::block_on(
        client.resolve(&name("offchain.test.astra"), &addr_query("offchain.test.astra")),
    )
    .unwrap_err();
    assert!(matches!(err, ClientError::Gateway(GatewayError::Backend(_))));
}

#[test]
fn client_config_defaults_from_empty_json() {
    let config: ClientConfig = serde_json::from_str("{}").unwrap();
    assert_eq!(config, ClientConfig::default());
    assert_eq!(config.gateway_timeout(), Duration::from_secs(5));
    let empty = ResolutionResult::Empty;
    assert!(!empty.has_value());
}
