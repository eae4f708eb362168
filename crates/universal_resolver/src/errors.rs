//! Error types for the universal resolver
//!
//! Only failures that abort a whole call live here. A slot that fails on its
//! own is reported through [`crate::ResolutionResult`] instead.

use thiserror::Error;
use unires_abi::AbiError;
use unires_names::NameError;
use unires_types::Selector;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error(transparent)]
    Name(#[from] NameError),

    #[error("Invalid continuation token: {0}")]
    InvalidContinuation(AbiError),

    #[error("Continuation token holds no slots")]
    EmptyContinuation,

    #[error("Invalid gateway response: {0}")]
    InvalidGatewayResponse(AbiError),

    #[error("Gateway returned {responses} responses for {pending} pending slots")]
    ContinuationMismatch { responses: usize, pending: usize },

    #[error("Malformed {record} record: {source}")]
    MalformedRecord {
        record: &'static str,
        source: AbiError,
    },

    #[error("Unknown callback selector {0}")]
    UnknownCallback(Selector),
}

pub type Result<T> = std::result::Result<T, ResolveError>;
