//! Driving port for credential authentication.
//!
//! Inbound adapters authenticate through this trait without importing the
//! backing infrastructure, so handler tests can substitute a deterministic
//! double instead of wiring a database.

use async_trait::async_trait;

use crate::domain::error::{ApiResult, Error};
use crate::domain::user::User;

use super::super::auth::LoginCredentials;
use super::super::role::Role;

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user.
    async fn authenticate(&self, credentials: &LoginCredentials) -> ApiResult<User>;
}

/// In-memory authenticator used in development and tests.
///
/// `admin@example.com` / `password` authenticates as a fixed admin user;
/// everything else is rejected with an unauthorized error.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureLoginService;

impl FixtureLoginService {
    const EMAIL: &'static str = "admin@example.com";
    const PASSWORD: &'static str = "password";
    const USER_ID: &'static str = "123e4567-e89b-12d3-a456-426614174000";
}

#[async_trait]
impl LoginService for FixtureLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> ApiResult<User> {
        if credentials.email().as_ref() == Self::EMAIL && credentials.password() == Self::PASSWORD {
            User::try_from_strings(Self::USER_ID, "Admin", Self::EMAIL, Role::Admin)
                .map_err(Error::wrap)
        } else {
            Err(Error::unauthorized().with_message("invalid credentials"))
        }
    }
}
