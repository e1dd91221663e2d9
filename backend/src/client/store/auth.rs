//! Auth slice: the identity the current session vouches for.

use serde::{Deserialize, Serialize};

use crate::domain::SessionUser;

/// Signed-in identity, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(default)]
pub struct AuthSlice {
    /// The session user, set on sign-in and cleared on sign-out.
    pub user: Option<SessionUser>,
}

impl AuthSlice {
    /// Whether a user is recorded.
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}
