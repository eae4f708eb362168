//! Error types for the in-memory registry

use thiserror::Error;
use unires_types::{Address, NodeId};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unauthorized: {caller} does not own node {node}")]
    Unauthorized { caller: Address, node: NodeId },
}

pub type Result<T> = std::result::Result<T, RegistryError>;
