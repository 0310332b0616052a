//! Role membership table
//!
//! Roles are data: a `{role -> admin role}` table plus an ordered member
//! list per role. Nothing here checks who is asking; that is the ledger's job.

use std::collections::HashMap;

use crate::identity::Identity;
use crate::role::models::Role;

/// Membership and admin-of relationship for every role
#[derive(Debug, Clone, Default)]
pub struct RoleTable {
    admins: HashMap<Role, Role>,
    members: HashMap<Role, Vec<Identity>>,
}

impl RoleTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the role allowed to grant and revoke `role`
    pub fn set_role_admin(&mut self, role: Role, admin: Role) {
        self.admins.insert(role, admin);
    }

    /// The role allowed to grant and revoke `role`, if any
    pub fn role_admin(&self, role: Role) -> Option<Role> {
        self.admins.get(&role).copied()
    }

    pub fn has_role(&self, role: Role, identity: &Identity) -> bool {
        self.members
            .get(&role)
            .map(|members| members.contains(identity))
            .unwrap_or(false)
    }

    /// Add `identity` to `role`. Returns false if it was already a member.
    pub fn insert(&mut self, role: Role, identity: Identity) -> bool {
        let members = self.members.entry(role).or_default();
        if members.contains(&identity) {
            return false;
        }
        members.push(identity);
        true
    }

    /// Remove `identity` from `role`, keeping the order of the rest.
    /// Returns false if it was not a member.
    pub fn remove(&mut self, role: Role, identity: &Identity) -> bool {
        match self.members.get_mut(&role) {
            Some(members) => {
                let before = members.len();
                members.retain(|member| member != identity);
                members.len() != before
            }
            None => false,
        }
    }

    /// Members of `role` in grant order
    pub fn members(&self, role: Role) -> &[Identity] {
        self.members.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }
}
