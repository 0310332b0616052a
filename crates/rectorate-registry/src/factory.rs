//! School factory port and the in-process reference factory

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rectorate_access::{Identity, SchoolHandle, IDENTITY_LEN};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};

use crate::error::FactoryError;

/// Creates School entities on behalf of the registry
///
/// The registry treats the returned handle as opaque. A failure aborts
/// the calling operation before the registry changes anything.
pub trait SchoolFactory: Send + Sync {
    fn create(&self, name: &str, director: Identity) -> Result<SchoolHandle, FactoryError>;

    /// Mark handles already issued in an earlier run so they are never
    /// handed out again. Factories with globally unique handles can ignore it.
    fn reserve(&self, _handles: &[SchoolHandle]) {}
}

/// What the reference factory remembers about a school it created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolRecord {
    pub handle: SchoolHandle,
    pub name: String,
    pub founding_director: Identity,
    pub created_at: DateTime<Utc>,
}

/// Factory that derives handles from its own identity and a nonce
///
/// The handle is the first 20 bytes of `sha256(identity || nonce)`, so a
/// factory with a fixed identity derives the same sequence every run.
/// Handles passed to [`SchoolFactory::reserve`] are skipped.
pub struct InMemorySchoolFactory {
    identity: Identity,
    state: RwLock<FactoryState>,
}

#[derive(Default)]
struct FactoryState {
    nonce: u64,
    records: HashMap<SchoolHandle, SchoolRecord>,
    reserved: HashSet<SchoolHandle>,
}

impl InMemorySchoolFactory {
    /// Create a factory with a random identity
    pub fn new() -> Self {
        Self::with_identity(Identity::random())
    }

    /// Create a factory with a fixed identity
    pub fn with_identity(identity: Identity) -> Self {
        Self {
            identity,
            state: RwLock::new(FactoryState::default()),
        }
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Record for a school this factory created
    pub fn get(&self, handle: &SchoolHandle) -> Option<SchoolRecord> {
        self.state.read().records.get(handle).cloned()
    }

    /// Number of schools created so far
    pub fn created(&self) -> usize {
        self.state.read().records.len()
    }

    fn derive_handle(&self, nonce: u64) -> SchoolHandle {
        let mut hasher = Sha256::new();
        hasher.update(self.identity.as_bytes());
        hasher.update(nonce.to_be_bytes());
        let digest = hasher.finalize();

        let mut bytes = [0u8; IDENTITY_LEN];
        bytes.copy_from_slice(&digest[..IDENTITY_LEN]);
        SchoolHandle::new(Identity::from_bytes(bytes))
    }
}

impl Default for InMemorySchoolFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SchoolFactory for InMemorySchoolFactory {
    fn create(&self, name: &str, director: Identity) -> Result<SchoolHandle, FactoryError> {
        if name.trim().is_empty() {
            return Err(FactoryError::Rejected("school name is empty".to_string()));
        }

        let mut state = self.state.write();
        let mut handle = self.derive_handle(state.nonce);
        state.nonce += 1;
        // A zero digest prefix is astronomically unlikely, but null is reserved
        while handle.is_null()
            || state.records.contains_key(&handle)
            || state.reserved.contains(&handle)
        {
            handle = self.derive_handle(state.nonce);
            state.nonce += 1;
        }

        state.records.insert(
            handle,
            SchoolRecord {
                handle,
                name: name.to_string(),
                founding_director: director,
                created_at: Utc::now(),
            },
        );

        tracing::debug!(school = %handle, name = %name, director = %director, "School entity created");
        Ok(handle)
    }

    fn reserve(&self, handles: &[SchoolHandle]) {
        let mut state = self.state.write();
        state.reserved.extend(handles.iter().copied());
        tracing::debug!(reserved = state.reserved.len(), "Reserved existing school handles");
    }
}
