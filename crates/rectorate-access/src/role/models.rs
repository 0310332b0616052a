//! Role data models

use serde::{Deserialize, Serialize};

/// One of the two fixed roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Root authority, set once at construction
    Rector,
    /// Delegated authority over the school registry
    Administrator,
}

impl Role {
    /// Every role, in table order
    pub const ALL: [Role; 2] = [Role::Rector, Role::Administrator];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Rector => "rector",
            Role::Administrator => "administrator",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "rector" => Some(Role::Rector),
            "administrator" => Some(Role::Administrator),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Rector => write!(f, "Rector"),
            Role::Administrator => write!(f, "Administrator"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_display() {
        assert_eq!(Role::Rector.to_string(), "Rector");
        assert_eq!(Role::Administrator.to_string(), "Administrator");
    }

    #[test]
    fn test_role_str_round_trip() {
        for role in Role::ALL {
            assert_eq!(Role::from_str(role.as_str()), Some(role));
        }
        assert_eq!(Role::from_str("dean"), None);
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&Role::Administrator).unwrap();
        assert_eq!(json, "\"administrator\"");
    }
}
