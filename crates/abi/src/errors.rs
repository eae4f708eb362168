//! Error types for the ABI codec

use thiserror::Error;
use unires_types::Selector;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AbiError {
    #[error("input truncated: need {needed} bytes at offset {offset}, have {available}")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("offset or length word does not fit in memory: 0x{word}")]
    InvalidOffset { word: String },

    #[error("invalid {kind} value")]
    InvalidValue { kind: &'static str },

    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("selector mismatch: expected {expected}, found {found}")]
    SelectorMismatch { expected: Selector, found: Selector },
}

pub type Result<T> = std::result::Result<T, AbiError>;
