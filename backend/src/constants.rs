//! Shared application constants: route table and role metadata.

use crate::domain::Role;

/// Well-known application routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    /// Landing page.
    pub home: &'static str,
    /// Sign-in page; the guard's default redirect for anonymous visitors.
    pub login: &'static str,
}

/// Immutable constants injected into every RPC context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constants {
    /// Route table used by the auth guard and handlers.
    pub routes: Routes,
    /// Role catalogue, most privileged first.
    pub roles: &'static [Role],
}

impl Constants {
    /// The single shared constants value.
    pub const fn new() -> Self {
        Self {
            routes: Routes {
                home: "/",
                login: "/auth/login",
            },
            roles: &Role::ALL,
        }
    }
}

impl Default for Constants {
    fn default() -> Self {
        Self::new()
    }
}
