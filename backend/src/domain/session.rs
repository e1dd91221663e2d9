//! Session model shared by the cookie adapter and the auth guard.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::role::Role;
use super::user::UserId;

/// Total session lifetime: 30 days.
pub const SESSION_LIFETIME_SECS: i64 = 30 * 24 * 60 * 60;

/// Re-stamp interval: records older than 24 hours are refreshed on read.
pub const SESSION_REFRESH_SECS: i64 = 24 * 60 * 60;

/// Authenticated identity stored in the session cookie.
///
/// ## Invariants
/// - `refreshed_at` never moves backwards; [`SessionRecord::refreshed`]
///   stamps the supplied clock value.
/// - Records older than [`SESSION_LIFETIME_SECS`] are treated as absent by
///   the adapter, independent of the cookie's own expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    user_id: UserId,
    role: Role,
    refreshed_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Stamp a fresh record for the authenticated user.
    pub fn new(user_id: UserId, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            role,
            refreshed_at: now,
        }
    }

    /// Owner of the session.
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// Role captured at sign-in.
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Instant the record was last stamped.
    pub const fn refreshed_at(&self) -> DateTime<Utc> {
        self.refreshed_at
    }

    /// Whether the record has outlived the 30-day session lifetime.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now - self.refreshed_at >= Duration::seconds(SESSION_LIFETIME_SECS)
    }

    /// Whether the record is due a re-stamp (older than 24 hours).
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        now - self.refreshed_at >= Duration::seconds(SESSION_REFRESH_SECS)
    }

    /// Copy of the record stamped at `now`.
    pub fn refreshed(&self, now: DateTime<Utc>) -> Self {
        Self {
            user_id: self.user_id.clone(),
            role: self.role,
            refreshed_at: now,
        }
    }

    /// Identity view handed to guards and procedures.
    pub fn session_user(&self) -> SessionUser {
        SessionUser {
            id: self.user_id.clone(),
            role: self.role,
        }
    }
}

/// Identity carried by an authenticated session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionUser {
    /// Stable user identifier.
    pub id: UserId,
    /// Role captured at sign-in.
    pub role: Role,
}

/// Client-observable session state consumed by the auth guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Session resolution is still in flight.
    Loading,
    /// No valid session exists.
    Unauthenticated,
    /// A valid session exists for this user.
    Authenticated(SessionUser),
}

impl SessionStatus {
    /// Identity view when authenticated.
    pub const fn user(&self) -> Option<&SessionUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Loading | Self::Unauthenticated => None,
        }
    }
}
