//! Shared harness for the workspace integration tests
//!
//! Wires one access ledger, one school registry and one in-memory event log
//! together the same way `Rectorate::from_config` does for an in-memory
//! configuration, while keeping the factory and the log reachable for
//! assertions.

#![allow(dead_code)]

use std::sync::Arc;

use rectorate_access::{AccessLedger, Event, Identity, InMemoryEventLog, Result};
use rectorate_registry::{InMemorySchoolFactory, RegistryProjection, RegistrySnapshot, SchoolRegistry};

/// A rector, its ledger and registry, and the log both publish to
pub struct Campus {
    pub rector: Identity,
    pub ledger: Arc<AccessLedger>,
    pub registry: Arc<SchoolRegistry>,
    pub factory: Arc<InMemorySchoolFactory>,
    pub log: InMemoryEventLog,
}

impl Campus {
    /// Appoint a fresh random rector
    pub fn new() -> Result<Self> {
        Self::with_rector(Identity::random())
    }

    pub fn with_rector(rector: Identity) -> Result<Self> {
        let log = InMemoryEventLog::new();
        let factory = Arc::new(InMemorySchoolFactory::new());
        let ledger = Arc::new(AccessLedger::new(rector, Arc::new(log.clone()))?);
        let registry = Arc::new(SchoolRegistry::new(
            ledger.clone(),
            factory.clone(),
            Arc::new(log.clone()),
        ));

        Ok(Campus {
            rector,
            ledger,
            registry,
            factory,
            log,
        })
    }

    /// Everything published so far
    pub fn events(&self) -> Vec<Event> {
        self.log.events()
    }

    /// Replay the log from scratch
    pub fn replay(&self) -> RegistrySnapshot {
        let events = self.events();
        RegistryProjection::from_events(&events).into_snapshot()
    }
}
