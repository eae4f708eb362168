//! Batch gateway wire format and gateway collaborators
//!
//! The universal resolver folds every pending lookup of a call into one
//! `query((address,string[],bytes)[])` request. The gateway answers with
//! `abi.encode(bool[] failures, bytes[] responses)`, one entry per request.

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use unires_abi::{AbiError, ParamType, Token};
use unires_types::{selectors, Address};

/// Errors that can occur while talking to a gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway backend error: {0}")]
    Backend(String),

    #[error("malformed gateway request: {0}")]
    MalformedRequest(AbiError),
}

impl From<anyhow::Error> for GatewayError {
    fn from(value: anyhow::Error) -> Self {
        Self::Backend(value.to_string())
    }
}

/// One lookup folded into a batch query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayRequest {
    /// Resolver that raised the lookup
    pub sender: Address,
    pub urls: Vec<String>,
    pub call_data: Vec<u8>,
}

/// Gateway answer for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayReply {
    pub failed: bool,
    pub data: Vec<u8>,
}

impl GatewayReply {
    pub fn ok(data: Vec<u8>) -> Self {
        Self {
            failed: false,
            data,
        }
    }

    pub fn failure(data: Vec<u8>) -> Self {
        Self { failed: true, data }
    }
}

fn request_type() -> ParamType {
    ParamType::array(ParamType::Tuple(vec![
        ParamType::Address,
        ParamType::array(ParamType::String),
        ParamType::Bytes,
    ]))
}

fn invalid(kind: &'static str) -> AbiError {
    AbiError::InvalidValue { kind }
}

pub fn encode_query(requests: &[GatewayRequest]) -> Vec<u8> {
    let items = requests
        .iter()
        .map(|request| {
            Token::Tuple(vec![
                Token::Address(request.sender),
                Token::strings(&request.urls),
                Token::Bytes(request.call_data.clone()),
            ])
        })
        .collect();
    unires_abi::encode_call(&selectors::GATEWAY_QUERY, &[Token::Array(items)])
}

pub fn decode_query(data: &[u8]) -> Result<Vec<GatewayRequest>, AbiError> {
    unires_abi::decode_call(&selectors::GATEWAY_QUERY, &[request_type()], data)?
        .into_iter()
        .next()
        .and_then(Token::into_array)
        .ok_or_else(|| invalid("query"))?
        .into_iter()
        .map(|item| {
            let mut fields = item.into_tuple().ok_or_else(|| invalid("request"))?.into_iter();
            let sender = fields
                .next()
                .and_then(Token::into_address)
                .ok_or_else(|| invalid("request sender"))?;
            let urls = fields
                .next()
                .and_then(Token::into_strings)
                .ok_or_else(|| invalid("request urls"))?;
            let call_data = fields
                .next()
                .and_then(Token::into_bytes)
                .ok_or_else(|| invalid("request callData"))?;
            Ok(GatewayRequest {
                sender,
                urls,
                call_data,
            })
        })
        .collect()
}

pub fn encode_replies(replies: &[GatewayReply]) -> Vec<u8> {
    let failures = replies.iter().map(|r| Token::Bool(r.failed)).collect();
    let responses = replies.iter().map(|r| Token::Bytes(r.data.clone())).collect();
    unires_abi::encode(&[Token::Array(failures), Token::Array(responses)])
}

/// Decodes a gateway response. Both arrays must have the same length.
pub fn decode_replies(data: &[u8]) -> Result<Vec<GatewayReply>, AbiError> {
    let mut tokens = unires_abi::decode(
        &[
            ParamType::array(ParamType::Bool),
            ParamType::array(ParamType::Bytes),
        ],
        data,
    )?
    .into_iter();
    let failures = tokens
        .next()
        .and_then(Token::into_array)
        .ok_or_else(|| invalid("failures"))?;
    let responses = tokens
        .next()
        .and_then(Token::into_array)
        .ok_or_else(|| invalid("responses"))?;
    if failures.len() != responses.len() {
        return Err(invalid("response count"));
    }
    failures
        .into_iter()
        .zip(responses)
        .map(|(failed, data)| {
            Ok(GatewayReply {
                failed: failed.into_bool().ok_or_else(|| invalid("failure flag"))?,
                data: data.into_bytes().ok_or_else(|| invalid("response"))?,
            })
        })
        .collect()
}

/// A batch gateway reachable at a list of URLs.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Submit `call_data` (a batch query) and return the raw response.
    async fn query(&self, urls: &[String], call_data: &[u8]) -> Result<Vec<u8>, GatewayError>;
}

/// Off-store data source behind a resolver's lookup URLs.
pub trait OffchainServer: Send + Sync {
    /// Answer the resolver's call data; `Err` carries the failure payload.
    fn serve(&self, call_data: &[u8]) -> Result<Vec<u8>, Vec<u8>>;
}

/// In-process batch gateway that routes each request to the server
/// registered for its sender.
#[derive(Clone, Default)]
pub struct LocalGateway {
    servers: Arc<RwLock<HashMap<Address, Arc<dyn OffchainServer>>>>,
}

impl LocalGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, sender: Address, server: Arc<dyn OffchainServer>) {
        self.servers.write().insert(sender, server);
    }

    /// Answer every request of a decoded batch.
    pub fn answer(&self, requests: &[GatewayRequest]) -> Vec<GatewayReply> {
        let servers = self.servers.read();
        requests
            .iter()
            .map(|request| match servers.get(&request.sender) {
                Some(server) => match server.serve(&request.call_data) {
                    Ok(data) => GatewayReply::ok(data),
                    Err(data) => GatewayReply::failure(data),
                },
                None => {
                    debug!(sender = %request.sender, "no server for lookup sender");
                    GatewayReply::failure(Vec::new())
                }
            })
            .collect()
    }
}

#[async_trait]
impl Gateway for LocalGateway {
    async fn query(&self, _urls: &[String], call_data: &[u8]) -> Result<Vec<u8>, GatewayError> {
        let requests = decode_query(call_data).map_err(GatewayError::MalformedRequest)?;
        Ok(encode_replies(&self.answer(&requests)))
    }
}
