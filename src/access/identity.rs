use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Id of the seeded root master account.
pub const ROOT_MASTER_ID: i64 = 1;

/// The three account tiers. Stored as lowercase TEXT; anything else never
/// parses, so downstream code can't see an out-of-range role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Role {
    Master,
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Master => "master",
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Provisioning hierarchy: master creates admins and users, admins create
    /// users, users create nothing.
    pub fn may_create(&self, target: Role) -> bool {
        match (self, target) {
            (Role::Master, Role::Admin) | (Role::Master, Role::User) => true,
            (Role::Admin, Role::User) => true,
            _ => false,
        }
    }

    /// Parent linkage invariant: the forest has depth at most two.
    /// An admin hangs off a master; a user hangs off the admin or master that
    /// created it. Masters are seeded, never created, and have no parent.
    pub fn valid_parent_role(&self, parent: Role) -> bool {
        match self {
            Role::Master => false,
            Role::Admin => parent == Role::Master,
            Role::User => parent == Role::Master || parent == Role::Admin,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "master" => Ok(Role::Master),
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

/// The verified (id, role) pair a request acts as. Built only from validated
/// JWT claims, never from client-supplied scope material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub role: Role,
}

impl Identity {
    pub fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }
}
