//! Error types for the name codec

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("Malformed name {name:?}: {reason}")]
    MalformedName { name: String, reason: String },

    #[error("Truncated name: label at offset {offset} needs {needed} bytes, {available} remain")]
    TruncatedName {
        offset: usize,
        needed: usize,
        available: usize,
    },
}

impl NameError {
    pub(crate) fn malformed(name: impl Into<String>, reason: impl Into<String>) -> Self {
        NameError::MalformedName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NameError>;
