//! Primitive identifiers shared across the universal resolver crates.
//!
//! Addresses name resolvers and principals, node identifiers name registry
//! entries and selectors name contract entry points on the wire.

pub mod address;
pub mod hash;
pub mod selector;

pub use address::*;
pub use hash::*;
pub use selector::*;
