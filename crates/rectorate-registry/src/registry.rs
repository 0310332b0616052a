//! Director to school registry
//!
//! Holds the partial bijection between directors and the schools they
//! govern. Every mutation runs check-then-commit under one write lock:
//! authorization, preconditions, the factory call and event publication
//! all happen before the first write to either map.

use parking_lot::RwLock;
use rectorate_access::{AccessLedger, Event, EventSink, Identity, Role, SchoolHandle};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::error::{FactoryError, RegistryError, Result};
use crate::factory::SchoolFactory;
use crate::projection::RegistrySnapshot;

/// Both directions of the mapping. The school count is the size of
/// `director_of`, so it cannot drift from the maps.
#[derive(Debug, Default)]
struct RegistryState {
    school_of: HashMap<Identity, SchoolHandle>,
    director_of: HashMap<SchoolHandle, Identity>,
}

/// Registry of schools and their directors
pub struct SchoolRegistry {
    ledger: Arc<AccessLedger>,
    factory: Arc<dyn SchoolFactory>,
    sink: Arc<dyn EventSink>,
    state: RwLock<RegistryState>,
}

impl SchoolRegistry {
    /// Create an empty registry gated by `ledger`
    pub fn new(
        ledger: Arc<AccessLedger>,
        factory: Arc<dyn SchoolFactory>,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        SchoolRegistry {
            ledger,
            factory,
            sink,
            state: RwLock::new(RegistryState::default()),
        }
    }

    /// Rebuild a registry from a consistent snapshot, publishing nothing
    pub fn restore(
        ledger: Arc<AccessLedger>,
        factory: Arc<dyn SchoolFactory>,
        sink: Arc<dyn EventSink>,
        snapshot: &RegistrySnapshot,
    ) -> Self {
        let state = RegistryState {
            school_of: snapshot
                .directors
                .iter()
                .map(|(director, school)| (*director, *school))
                .collect(),
            director_of: snapshot
                .schools
                .iter()
                .map(|(school, director)| (*school, *director))
                .collect(),
        };

        tracing::info!(school_count = state.director_of.len(), "School registry restored");

        SchoolRegistry {
            ledger,
            factory,
            sink,
            state: RwLock::new(state),
        }
    }

    /// The ledger this registry checks callers against
    pub fn ledger(&self) -> &Arc<AccessLedger> {
        &self.ledger
    }

    /// Create a school governed by `director`
    ///
    /// Emits `DirectorSet` then `SchoolCreated` and returns the factory's handle.
    pub fn create_school(
        &self,
        caller: Identity,
        name: &str,
        director: Identity,
    ) -> Result<SchoolHandle> {
        let mut state = self.state.write();
        self.authorize(caller)?;

        if director.is_null() || state.school_of.contains_key(&director) {
            tracing::warn!(caller = %caller, director = %director, "Director already governs a school");
            return Err(RegistryError::AlreadyDirector(director));
        }

        let handle = self.factory.create(name, director).map_err(|e| {
            tracing::warn!(caller = %caller, name = %name, error = %e, "School factory failed");
            e
        })?;
        if handle.is_null() {
            return Err(FactoryError::NullHandle.into());
        }
        if state.director_of.contains_key(&handle) {
            return Err(FactoryError::HandleInUse(handle).into());
        }

        self.sink.publish(&[
            Event::DirectorSet {
                director,
                school: handle,
            },
            Event::SchoolCreated {
                school: handle,
                director,
                name: name.to_string(),
            },
        ])?;

        state.school_of.insert(director, handle);
        state.director_of.insert(handle, director);

        tracing::info!(
            caller = %caller,
            school = %handle,
            director = %director,
            name = %name,
            school_count = state.director_of.len(),
            "School created"
        );

        Ok(handle)
    }

    /// Forget the association of `school` with its director
    ///
    /// The School entity itself is left alone. Emits `SchoolDeleted`.
    pub fn delete_school(&self, caller: Identity, school: SchoolHandle) -> Result<()> {
        let mut state = self.state.write();
        self.authorize(caller)?;

        let director = match state.director_of.get(&school) {
            Some(director) => *director,
            None => {
                tracing::warn!(caller = %caller, school = %school, "Delete of unknown school");
                return Err(RegistryError::UnknownSchool(school));
            }
        };

        self.sink
            .publish(&[Event::SchoolDeleted { school, director }])?;

        state.director_of.remove(&school);
        state.school_of.remove(&director);

        tracing::info!(
            caller = %caller,
            school = %school,
            director = %director,
            school_count = state.director_of.len(),
            "School deleted"
        );

        Ok(())
    }

    /// Move `old_director`'s school to `new_director`
    ///
    /// `old_director == new_director` is rejected with `AlreadyDirector`.
    /// Emits `DirectorSet`.
    pub fn change_school_director(
        &self,
        caller: Identity,
        old_director: Identity,
        new_director: Identity,
    ) -> Result<()> {
        let mut state = self.state.write();
        self.authorize(caller)?;

        let school = match state.school_of.get(&old_director) {
            Some(school) => *school,
            None => {
                tracing::warn!(caller = %caller, director = %old_director, "Reassignment from a non-director");
                return Err(RegistryError::NotADirector(old_director));
            }
        };

        if new_director.is_null() || state.school_of.contains_key(&new_director) {
            tracing::warn!(caller = %caller, director = %new_director, "Director already governs a school");
            return Err(RegistryError::AlreadyDirector(new_director));
        }

        self.sink.publish(&[Event::DirectorSet {
            director: new_director,
            school,
        }])?;

        state.school_of.remove(&old_director);
        state.school_of.insert(new_director, school);
        state.director_of.insert(school, new_director);

        tracing::info!(
            caller = %caller,
            school = %school,
            old_director = %old_director,
            new_director = %new_director,
            "School director changed"
        );

        Ok(())
    }

    /// Number of schools currently registered
    pub fn school_count(&self) -> u64 {
        self.state.read().director_of.len() as u64
    }

    /// School governed by `identity`, if any
    pub fn school_of(&self, identity: &Identity) -> Option<SchoolHandle> {
        self.state.read().school_of.get(identity).copied()
    }

    /// Director of `school`, if any
    pub fn director_of(&self, school: &SchoolHandle) -> Option<Identity> {
        self.state.read().director_of.get(school).copied()
    }

    pub fn is_director(&self, identity: &Identity) -> bool {
        self.state.read().school_of.contains_key(identity)
    }

    pub fn is_school(&self, school: &SchoolHandle) -> bool {
        self.state.read().director_of.contains_key(school)
    }

    /// Every registered school with its director, ordered by handle
    pub fn schools(&self) -> Vec<(SchoolHandle, Identity)> {
        let state = self.state.read();
        let mut schools: Vec<(SchoolHandle, Identity)> = state
            .director_of
            .iter()
            .map(|(school, director)| (*school, *director))
            .collect();
        schools.sort();
        schools
    }

    /// Point-in-time copy of the registry and the administrator set
    pub fn snapshot(&self) -> RegistrySnapshot {
        let state = self.state.read();
        RegistrySnapshot {
            administrators: self.ledger.role_members(Role::Administrator),
            directors: state
                .school_of
                .iter()
                .map(|(director, school)| (*director, *school))
                .collect::<BTreeMap<_, _>>(),
            schools: state
                .director_of
                .iter()
                .map(|(school, director)| (*school, *director))
                .collect::<BTreeMap<_, _>>(),
            school_count: state.director_of.len() as u64,
        }
    }

    fn authorize(&self, caller: Identity) -> Result<()> {
        self.ledger
            .check_role(Role::Administrator, caller)
            .map_err(RegistryError::from)
    }
}
