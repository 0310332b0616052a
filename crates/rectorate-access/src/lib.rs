//! Access ledger for Rectorate
//!
//! Provides the two-role authority model (a single root Rector and a set of
//! delegated Administrators), the opaque identities it is keyed by, and the
//! ordered event log every state transition is published to.

pub mod error;
pub mod events;
pub mod identity;
pub mod ledger;
pub mod role;

pub use error::{AccessError, EventLogError, IdentityParseError, Result};
pub use events::{Event, EventRecord, EventSink, FileEventLog, InMemoryEventLog, NullEventSink};
pub use identity::{Identity, SchoolHandle, IDENTITY_LEN};
pub use ledger::AccessLedger;
pub use role::{Role, RoleTable};
