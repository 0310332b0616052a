//! Error types for the access ledger

use thiserror::Error;

use crate::identity::Identity;
use crate::role::Role;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, AccessError>;

/// Errors that can occur in the access ledger
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Unauthorized: {caller} does not hold the {required} role")]
    Unauthorized { required: Role, caller: Identity },

    #[error("The null identity cannot be appointed rector")]
    NullRector,

    #[error("Event log error: {0}")]
    EventLog(#[from] EventLogError),
}

/// Errors raised by an event sink
#[derive(Error, Debug)]
pub enum EventLogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors parsing an identity from text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityParseError {
    #[error("Invalid identity length in {input}: expected 40 hex digits, found {found}")]
    Length { input: String, found: usize },

    #[error("Invalid identity hex in {input}: {reason}")]
    Hex { input: String, reason: String },
}
