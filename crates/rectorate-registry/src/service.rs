//! Caller-facing service pairing one ledger with one registry

use rectorate_access::{
    AccessLedger, Event, EventLogError, EventRecord, EventSink, FileEventLog, Identity,
    InMemoryEventLog, Role, SchoolHandle,
};
use std::sync::Arc;

use crate::config::RectorateConfig;
use crate::error::{ConfigError, Result};
use crate::factory::SchoolFactory;
use crate::projection::RegistryProjection;
use crate::registry::SchoolRegistry;

/// Event log chosen by configuration
#[derive(Clone)]
pub enum EventLogHandle {
    Memory(InMemoryEventLog),
    File(Arc<FileEventLog>),
}

impl EventLogHandle {
    /// Every record written so far
    pub fn records(&self) -> std::result::Result<Vec<EventRecord>, EventLogError> {
        match self {
            EventLogHandle::Memory(log) => Ok(log.records()),
            EventLogHandle::File(log) => log.load(),
        }
    }

    fn sink(&self) -> Arc<dyn EventSink> {
        match self {
            EventLogHandle::Memory(log) => Arc::new(log.clone()),
            EventLogHandle::File(log) => log.clone() as Arc<dyn EventSink>,
        }
    }
}

/// One access ledger and the school registry it gates
///
/// Both are explicit dependencies so independent instances can coexist in
/// one process.
pub struct Rectorate {
    ledger: Arc<AccessLedger>,
    registry: Arc<SchoolRegistry>,
    event_log: Option<EventLogHandle>,
}

impl Rectorate {
    /// Wrap an existing ledger and registry
    pub fn new(ledger: Arc<AccessLedger>, registry: Arc<SchoolRegistry>) -> Self {
        Rectorate {
            ledger,
            registry,
            event_log: None,
        }
    }

    /// Build a ledger and registry on the event log named by `config`
    ///
    /// A file log that already holds events is replayed and the state it
    /// describes is restored instead of appointing the rector again.
    pub fn from_config(
        config: &RectorateConfig,
        factory: Arc<dyn SchoolFactory>,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;

        let event_log = match &config.event_log.path {
            Some(path) => {
                let log = FileEventLog::open(path)?;
                tracing::info!(path = %log.path().display(), "Using file event log");
                EventLogHandle::File(Arc::new(log))
            }
            None => EventLogHandle::Memory(InMemoryEventLog::new()),
        };
        let sink = event_log.sink();
        let records = event_log.records()?;

        let (ledger, registry) = if records.is_empty() {
            let ledger = Arc::new(AccessLedger::new(config.rector, sink.clone())?);
            let registry = SchoolRegistry::new(ledger.clone(), factory, sink);
            (ledger, registry)
        } else {
            let projection = RegistryProjection::from_events(records.iter().map(|r| &r.event));
            let rector = projection.rector().ok_or_else(|| {
                ConfigError::Validation("event log has no RectorAppointed event".to_string())
            })?;
            if rector != config.rector {
                return Err(ConfigError::Validation(format!(
                    "event log was created for rector {} but configuration names {}",
                    rector, config.rector
                )));
            }
            let snapshot = projection.snapshot();
            if !snapshot.is_consistent() {
                return Err(ConfigError::Validation(
                    "event log replays to an inconsistent registry".to_string(),
                ));
            }

            tracing::info!(
                events = records.len(),
                school_count = snapshot.school_count,
                "Replayed event log"
            );

            let issued: Vec<SchoolHandle> = records
                .iter()
                .filter_map(|record| match &record.event {
                    Event::SchoolCreated { school, .. } => Some(*school),
                    _ => None,
                })
                .chain(snapshot.schools.keys().copied())
                .collect();
            factory.reserve(&issued);

            let ledger = Arc::new(AccessLedger::restore(
                rector,
                &snapshot.administrators,
                sink.clone(),
            )?);
            let registry = SchoolRegistry::restore(ledger.clone(), factory, sink, snapshot);
            (ledger, registry)
        };

        Ok(Rectorate {
            ledger,
            registry: Arc::new(registry),
            event_log: Some(event_log),
        })
    }

    pub fn ledger(&self) -> &Arc<AccessLedger> {
        &self.ledger
    }

    pub fn registry(&self) -> &Arc<SchoolRegistry> {
        &self.registry
    }

    /// The event log built by [`Rectorate::from_config`], if any
    pub fn event_log(&self) -> Option<&EventLogHandle> {
        self.event_log.as_ref()
    }

    pub fn grant_administrator(&self, caller: Identity, target: Identity) -> Result<()> {
        Ok(self.ledger.grant_administrator(caller, target)?)
    }

    pub fn revoke_administrator(&self, caller: Identity, target: Identity) -> Result<()> {
        Ok(self.ledger.revoke_administrator(caller, target)?)
    }

    pub fn renounce_administrator(&self, caller: Identity) -> Result<()> {
        Ok(self.ledger.renounce_administrator(caller)?)
    }

    pub fn has_role(&self, role: Role, identity: &Identity) -> bool {
        self.ledger.has_role(role, identity)
    }

    pub fn role_members(&self, role: Role) -> Vec<Identity> {
        self.ledger.role_members(role)
    }

    pub fn create_school(
        &self,
        caller: Identity,
        name: &str,
        director: Identity,
    ) -> Result<SchoolHandle> {
        self.registry.create_school(caller, name, director)
    }

    pub fn delete_school(&self, caller: Identity, school: SchoolHandle) -> Result<()> {
        self.registry.delete_school(caller, school)
    }

    pub fn change_school_director(
        &self,
        caller: Identity,
        old_director: Identity,
        new_director: Identity,
    ) -> Result<()> {
        self.registry
            .change_school_director(caller, old_director, new_director)
    }
}
