//! Role model shared by sessions, users, and the auth guard.

use std::fmt;

use serde::{Deserialize, Serialize};

/// System role carried on the user record and the session.
///
/// Each role binds a privilege level; lower levels are more privileged.
/// String forms are lowercase on the wire and in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    User,
    Audit,
}

impl Role {
    /// Every role, most privileged first.
    pub const ALL: [Self; 4] = [Self::Superadmin, Self::Admin, Self::User, Self::Audit];

    /// Privilege level; lower is more privileged.
    pub const fn level(self) -> u8 {
        match self {
            Self::Superadmin => 1,
            Self::Admin => 2,
            Self::User => 3,
            Self::Audit => 4,
        }
    }

    /// Lowercase wire/database form.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Superadmin => "superadmin",
            Self::Admin => "admin",
            Self::User => "user",
            Self::Audit => "audit",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {value}")]
pub struct UnknownRole {
    /// The rejected input.
    pub value: String,
}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "superadmin" => Ok(Self::Superadmin),
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            "audit" => Ok(Self::Audit),
            other => Err(UnknownRole {
                value: other.to_owned(),
            }),
        }
    }
}
