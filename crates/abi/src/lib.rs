//! Contract ABI codec.
//!
//! Implements the head/tail layout used for resolver calldata, return data,
//! the `OffchainLookup` error and the continuation token. Only the types the
//! resolution protocol needs are supported: addresses, booleans, 256-bit
//! unsigned words, fixed bytes, dynamic bytes and strings, dynamic arrays and
//! tuples.

pub mod decode;
pub mod encode;
pub mod errors;
pub mod token;

pub use decode::{decode, decode_call};
pub use encode::{encode, encode_call};
pub use errors::*;
pub use token::{ParamType, Token};

/// Size of one ABI word.
pub const WORD: usize = 32;
