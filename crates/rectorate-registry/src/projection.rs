//! Rebuilds registry state from an event stream
//!
//! An indexer that only sees the event log can fold it through
//! [`RegistryProjection`] and obtain the same [`RegistrySnapshot`] the live
//! registry reports.

use rectorate_access::{Event, Identity, SchoolHandle};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Point-in-time view of administrators and the director/school mapping
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    /// Administrators in grant order
    pub administrators: Vec<Identity>,
    pub directors: BTreeMap<Identity, SchoolHandle>,
    pub schools: BTreeMap<SchoolHandle, Identity>,
    pub school_count: u64,
}

impl RegistrySnapshot {
    /// Whether both maps are exact inverses and the count matches
    pub fn is_consistent(&self) -> bool {
        self.directors.len() == self.schools.len()
            && self.school_count == self.schools.len() as u64
            && !self.directors.contains_key(&Identity::NULL)
            && !self.schools.contains_key(&SchoolHandle::NULL)
            && self
                .directors
                .iter()
                .all(|(director, school)| self.schools.get(school) == Some(director))
    }
}

/// Folds events into a [`RegistrySnapshot`]
#[derive(Debug, Clone, Default)]
pub struct RegistryProjection {
    snapshot: RegistrySnapshot,
    rector: Option<Identity>,
    applied: u64,
}

impl RegistryProjection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a projection from a whole stream
    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a Event>,
    {
        let mut projection = Self::new();
        for event in events {
            projection.apply(event);
        }
        projection
    }

    /// Apply one event
    ///
    /// Events are applied idempotently: re-granting an administrator or
    /// re-setting a director to the same school leaves the state unchanged.
    pub fn apply(&mut self, event: &Event) {
        let snapshot = &mut self.snapshot;
        match event {
            Event::RectorAppointed { rector } => {
                self.rector.get_or_insert(*rector);
            }
            Event::AdministratorGranted { account } => {
                if !snapshot.administrators.contains(account) {
                    snapshot.administrators.push(*account);
                }
            }
            Event::AdministratorRevoked { account } => {
                snapshot.administrators.retain(|admin| admin != account);
            }
            Event::DirectorSet { director, school } => {
                if let Some(previous) = snapshot.schools.insert(*school, *director) {
                    if previous != *director {
                        snapshot.directors.remove(&previous);
                    }
                }
                snapshot.directors.insert(*director, *school);
            }
            // DirectorSet already recorded the pair
            Event::SchoolCreated { .. } => {}
            Event::SchoolDeleted { school, director } => {
                snapshot.schools.remove(school);
                snapshot.directors.remove(director);
            }
        }
        snapshot.school_count = snapshot.schools.len() as u64;
        self.applied += 1;
    }

    /// The first rector appointed in the stream
    pub fn rector(&self) -> Option<Identity> {
        self.rector
    }

    /// Number of events applied so far
    pub fn applied(&self) -> u64 {
        self.applied
    }

    pub fn snapshot(&self) -> &RegistrySnapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> RegistrySnapshot {
        self.snapshot
    }
}
