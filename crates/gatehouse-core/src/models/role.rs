//! Role domain model.
//!
//! Roles form an ordered privilege ladder: a lower discriminant means
//! more privilege, so `Admin` satisfies every requirement a `Moderator`
//! or `User` would.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Admin = 1,
    Moderator = 2,
    User = 3,
}

impl Role {
    /// Whether this role meets the given capability requirement.
    pub fn satisfies(self, required: Role) -> bool {
        self <= required
    }

    /// Stable string form used for persistence.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Moderator => "Moderator",
            Role::User => "User",
        }
    }

    /// Parse the persisted string form.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "Admin" => Some(Role::Admin),
            "Moderator" => Some(Role::Moderator),
            "User" => Some(Role::User),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
