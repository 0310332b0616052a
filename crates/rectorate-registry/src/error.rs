//! Error types for the school registry

use rectorate_access::{AccessError, EventLogError, Identity, Role, SchoolHandle};
use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Errors that can occur in registry operations
///
/// Every variant is a rejected operation; none leaves the mapping half-updated.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Unauthorized: {caller} does not hold the {required} role")]
    Unauthorized { required: Role, caller: Identity },

    #[error("Already a director: {0}")]
    AlreadyDirector(Identity),

    #[error("Not a director: {0}")]
    NotADirector(Identity),

    #[error("Unknown school: {0}")]
    UnknownSchool(SchoolHandle),

    #[error("The null identity cannot be appointed rector")]
    NullRector,

    #[error("School factory failed: {0}")]
    CollaboratorFailure(#[from] FactoryError),

    #[error("Event log error: {0}")]
    EventLog(#[from] EventLogError),
}

impl From<AccessError> for RegistryError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthorized { required, caller } => {
                RegistryError::Unauthorized { required, caller }
            }
            AccessError::NullRector => RegistryError::NullRector,
            AccessError::EventLog(e) => RegistryError::EventLog(e),
        }
    }
}

/// Errors raised by a school factory
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("School creation rejected: {0}")]
    Rejected(String),

    #[error("Factory returned the null handle")]
    NullHandle,

    #[error("Factory returned a handle already in the registry: {0}")]
    HandleInUse(SchoolHandle),
}

/// Errors loading configuration or installing logging
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration load error: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Event log error: {0}")]
    EventLog(#[from] EventLogError),

    #[error("Access ledger error: {0}")]
    Access(#[from] AccessError),

    #[error("Logging error: {0}")]
    Logging(String),
}
