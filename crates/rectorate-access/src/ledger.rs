//! Rector and Administrator role ledger
//!
//! The ledger owns the role table and answers "does this caller hold that
//! role". Administrator membership is managed by Rector holders; Rector
//! membership is fixed at construction.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{AccessError, Result};
use crate::events::{Event, EventSink};
use crate::identity::Identity;
use crate::role::{Role, RoleTable};

/// Two-role access ledger
pub struct AccessLedger {
    roles: RwLock<RoleTable>,
    sink: Arc<dyn EventSink>,
}

impl AccessLedger {
    /// Create a ledger rooted at `rector`
    ///
    /// The rector also becomes the first Administrator, and Rector is made
    /// the admin role of Administrator. Emits `RectorAppointed` then
    /// `AdministratorGranted`. The null identity is rejected before
    /// anything is published.
    pub fn new(rector: Identity, sink: Arc<dyn EventSink>) -> Result<Self> {
        Self::require_rector(rector)?;
        sink.publish(&[
            Event::RectorAppointed { rector },
            Event::AdministratorGranted { account: rector },
        ])?;

        let mut roles = RoleTable::new();
        roles.set_role_admin(Role::Administrator, Role::Rector);
        roles.insert(Role::Rector, rector);
        roles.insert(Role::Administrator, rector);

        tracing::info!(rector = %rector, "Access ledger created");

        Ok(Self {
            roles: RwLock::new(roles),
            sink,
        })
    }

    /// Rebuild a ledger from state recovered out of an event log
    ///
    /// Publishes nothing: the events that produced this state are already
    /// in the log.
    pub fn restore(
        rector: Identity,
        administrators: &[Identity],
        sink: Arc<dyn EventSink>,
    ) -> Result<Self> {
        Self::require_rector(rector)?;

        let mut roles = RoleTable::new();
        roles.set_role_admin(Role::Administrator, Role::Rector);
        roles.insert(Role::Rector, rector);
        for admin in administrators {
            roles.insert(Role::Administrator, *admin);
        }

        tracing::info!(
            rector = %rector,
            administrators = administrators.len(),
            "Access ledger restored"
        );

        Ok(Self {
            roles: RwLock::new(roles),
            sink,
        })
    }

    /// Grant the Administrator role to `target`
    ///
    /// Granting to an existing Administrator changes nothing but still
    /// emits `AdministratorGranted`.
    pub fn grant_administrator(&self, caller: Identity, target: Identity) -> Result<()> {
        let mut roles = self.roles.write();
        Self::require_admin_of(&roles, Role::Administrator, caller)?;

        self.sink
            .publish(&[Event::AdministratorGranted { account: target }])?;
        let added = roles.insert(Role::Administrator, target);

        tracing::info!(
            caller = %caller,
            target = %target,
            added,
            "Administrator role granted"
        );
        Ok(())
    }

    /// Revoke the Administrator role from `target`
    ///
    /// Revoking from a non-Administrator changes nothing but still emits
    /// `AdministratorRevoked`.
    pub fn revoke_administrator(&self, caller: Identity, target: Identity) -> Result<()> {
        let mut roles = self.roles.write();
        Self::require_admin_of(&roles, Role::Administrator, caller)?;

        self.sink
            .publish(&[Event::AdministratorRevoked { account: target }])?;
        let removed = roles.remove(Role::Administrator, &target);

        tracing::info!(
            caller = %caller,
            target = %target,
            removed,
            "Administrator role revoked"
        );
        Ok(())
    }

    /// Drop the caller's own Administrator role
    ///
    /// Needs no other role. Emits `AdministratorRevoked` only when the
    /// caller actually held the role.
    pub fn renounce_administrator(&self, caller: Identity) -> Result<()> {
        let mut roles = self.roles.write();
        if !roles.has_role(Role::Administrator, &caller) {
            return Ok(());
        }

        self.sink
            .publish(&[Event::AdministratorRevoked { account: caller }])?;
        roles.remove(Role::Administrator, &caller);

        tracing::info!(caller = %caller, "Administrator role renounced");
        Ok(())
    }

    pub fn has_role(&self, role: Role, identity: &Identity) -> bool {
        self.roles.read().has_role(role, identity)
    }

    /// Fail with `Unauthorized` unless `caller` holds `role`
    pub fn check_role(&self, role: Role, caller: Identity) -> Result<()> {
        if self.has_role(role, &caller) {
            Ok(())
        } else {
            tracing::warn!(caller = %caller, required = %role, "Caller lacks required role");
            Err(AccessError::Unauthorized {
                required: role,
                caller,
            })
        }
    }

    /// Members of `role` in grant order
    ///
    /// Revocation compacts the list: remaining members keep their relative
    /// order and a re-granted identity moves to the end.
    pub fn role_members(&self, role: Role) -> Vec<Identity> {
        self.roles.read().members(role).to_vec()
    }

    pub fn role_member_count(&self, role: Role) -> usize {
        self.roles.read().members(role).len()
    }

    /// Member of `role` at `index` in grant order
    pub fn role_member(&self, role: Role, index: usize) -> Option<Identity> {
        self.roles.read().members(role).get(index).copied()
    }

    /// The role that grants and revokes `role`
    pub fn admin_role(&self, role: Role) -> Option<Role> {
        self.roles.read().role_admin(role)
    }

    /// The root identity
    pub fn rector(&self) -> Identity {
        self.role_member(Role::Rector, 0).unwrap_or(Identity::NULL)
    }

    fn require_rector(rector: Identity) -> Result<()> {
        if rector.is_null() {
            tracing::warn!("Rejected the null identity as rector");
            return Err(AccessError::NullRector);
        }
        Ok(())
    }

    fn require_admin_of(roles: &RoleTable, role: Role, caller: Identity) -> Result<()> {
        let required = roles.role_admin(role).unwrap_or(role);
        if roles.has_role(required, &caller) {
            return Ok(());
        }

        tracing::warn!(
            caller = %caller,
            required = %required,
            role = %role,
            "Rejected role change from unauthorized caller"
        );
        Err(AccessError::Unauthorized { required, caller })
    }
}
