//! Event data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::{Identity, SchoolHandle};

/// State transition emitted by the ledger or the registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// The root identity was installed at construction
    RectorAppointed { rector: Identity },
    AdministratorGranted { account: Identity },
    AdministratorRevoked { account: Identity },
    SchoolCreated {
        school: SchoolHandle,
        director: Identity,
        name: String,
    },
    SchoolDeleted {
        school: SchoolHandle,
        director: Identity,
    },
    /// `director` now governs `school`
    DirectorSet {
        director: Identity,
        school: SchoolHandle,
    },
}

impl Event {
    /// Stable name of the event kind
    pub fn kind(&self) -> &'static str {
        match self {
            Event::RectorAppointed { .. } => "RectorAppointed",
            Event::AdministratorGranted { .. } => "AdministratorGranted",
            Event::AdministratorRevoked { .. } => "AdministratorRevoked",
            Event::SchoolCreated { .. } => "SchoolCreated",
            Event::SchoolDeleted { .. } => "SchoolDeleted",
            Event::DirectorSet { .. } => "DirectorSet",
        }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::RectorAppointed { rector } => write!(f, "RectorAppointed({})", rector),
            Event::AdministratorGranted { account } => {
                write!(f, "AdministratorGranted({})", account)
            }
            Event::AdministratorRevoked { account } => {
                write!(f, "AdministratorRevoked({})", account)
            }
            Event::SchoolCreated {
                school,
                director,
                name,
            } => write!(f, "SchoolCreated({}, {}, {:?})", school, director, name),
            Event::SchoolDeleted { school, director } => {
                write!(f, "SchoolDeleted({}, {})", school, director)
            }
            Event::DirectorSet { director, school } => {
                write!(f, "DirectorSet({}, {})", director, school)
            }
        }
    }
}

/// Entry in an event log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the log, starting at zero
    pub sequence: u64,
    /// Unique identifier for this record
    pub id: Uuid,
    /// When the record was appended
    pub recorded_at: DateTime<Utc>,
    pub event: Event,
}

impl EventRecord {
    /// Create a new record at `sequence`
    pub fn new(sequence: u64, event: Event) -> Self {
        Self {
            sequence,
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            event,
        }
    }
}
