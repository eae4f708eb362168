//! Name codec for the universal resolver.
//!
//! Converts human-readable dotted names (`sub.test.astra`) to and from the
//! length-prefixed wire encoding and computes the hierarchical node hash.
//! Labels written as `[<64 hex chars>]` are opaque: they carry their label
//! hash directly and their plaintext is never needed.

pub mod errors;
pub mod label;
pub mod name;

pub use errors::*;
pub use label::Label;
pub use name::{Ancestor, Name};

use unires_types::NodeId;

/// Longest label the wire form can carry.
pub const MAX_LABEL_LENGTH: usize = 255;
/// Longest accepted wire encoding of a full name, terminator included.
pub const MAX_NAME_LENGTH: usize = 1024;
/// Default parent of reverse records.
pub const DEFAULT_REVERSE_SUFFIX: &str = "addr.reverse";

/// Encodes a dotted name into its wire form.
pub fn encode(dotted: &str) -> Result<Vec<u8>> {
    Ok(Name::parse(dotted)?.to_wire())
}

/// Decodes a wire-form name back to its dotted form.
pub fn decode(wire: &[u8]) -> Result<String> {
    Ok(Name::from_wire(wire)?.to_string())
}

/// Node hash of a dotted name.
pub fn namehash(dotted: &str) -> Result<NodeId> {
    Ok(Name::parse(dotted)?.namehash())
}

/// Label hash of a single dotted-form label.
pub fn labelhash(label: &str) -> Result<[u8; 32]> {
    Ok(Label::parse(label)?.labelhash())
}
