//! Actor / Role
//!
//! Capability tokens: every mutating ledger operation takes the acting
//! user explicitly rather than reading ambient auth state.

use serde::{Deserialize, Serialize};

/// Club roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Role {
    Admin,
    Coach,
    Medical,
    Partner,
    Player,
}

impl Role {
    /// Staff roles allowed to assign memberships and adjust usage
    pub fn can_manage_memberships(&self) -> bool {
        matches!(self, Role::Admin | Role::Coach)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Coach => "COACH",
            Role::Medical => "MEDICAL",
            Role::Partner => "PARTNER",
            Role::Player => "PLAYER",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "COACH" => Ok(Role::Coach),
            "MEDICAL" => Ok(Role::Medical),
            "PARTNER" => Ok(Role::Partner),
            "PLAYER" => Ok(Role::Player),
            other => Err(format!("Unknown role: {other}")),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The acting user, passed into every mutating operation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn role_round_trips_through_str() {
        for role in [
            Role::Admin,
            Role::Coach,
            Role::Medical,
            Role::Partner,
            Role::Player,
        ] {
            assert_eq!(Role::from_str(role.as_str()).unwrap(), role);
        }
        assert!(Role::from_str("JANITOR").is_err());
    }

    #[test]
    fn only_staff_manage_memberships() {
        assert!(Role::Admin.can_manage_memberships());
        assert!(Role::Coach.can_manage_memberships());
        assert!(!Role::Medical.can_manage_memberships());
        assert!(!Role::Partner.can_manage_memberships());
        assert!(!Role::Player.can_manage_memberships());
    }
}
