//! Rectorate School Registry
//!
//! This crate keeps the strict one-to-one mapping between directors and the
//! schools they govern. Every mutation is gated by the Administrator role of
//! the access ledger and either takes full effect or none.
//!
//! The module integrates with:
//! - rectorate-access: role checks, identities and the event log
//! - a `SchoolFactory` supplied by the caller: School entity creation

pub mod config;
pub mod error;
pub mod factory;
pub mod logging;
pub mod projection;
pub mod registry;
pub mod service;

// Re-export public types
pub use config::{ConfigLoader, EventLogConfig, LoggingConfig, RectorateConfig};
pub use error::{ConfigError, FactoryError, RegistryError, Result};
pub use factory::{InMemorySchoolFactory, SchoolFactory, SchoolRecord};
pub use logging::init_logging;
pub use projection::{RegistryProjection, RegistrySnapshot};
pub use registry::SchoolRegistry;
pub use service::{EventLogHandle, Rectorate};

pub use rectorate_access::{AccessLedger, Event, Identity, Role, SchoolHandle};
