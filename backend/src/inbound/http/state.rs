//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    FixtureLoginService, InMemoryTokenStore, InMemoryUserRepository, LoginService, TokenStore,
    UserRepository,
};
use crate::domain::{Role, User, UserId};
use crate::rpc::{ContextBuilder, Router, starter_router};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UserRepository>,
    pub tokens: Arc<dyn TokenStore>,
    pub router: Arc<Router>,
}

impl HttpState {
    /// Construct state from port implementations and a procedure router.
    pub fn new(
        login: Arc<dyn LoginService>,
        users: Arc<dyn UserRepository>,
        tokens: Arc<dyn TokenStore>,
        router: Arc<Router>,
    ) -> Self {
        Self {
            login,
            users,
            tokens,
            router,
        }
    }

    /// Fixture-backed state for tests and DB-less development.
    ///
    /// The user repository is seeded with the record behind the fixture
    /// login service, so a sign-in followed by an RPC call resolves to a
    /// stored user.
    pub fn fixture() -> Self {
        let admin = User::try_from_strings(
            "123e4567-e89b-12d3-a456-426614174000",
            "Admin",
            "admin@example.com",
            Role::Admin,
        )
        .unwrap_or_else(|err| unreachable!("fixture user is valid: {err}"));
        Self::new(
            Arc::new(FixtureLoginService),
            Arc::new(InMemoryUserRepository::with_users([admin])),
            Arc::new(InMemoryTokenStore::default()),
            Arc::new(starter_router()),
        )
    }

    /// Builder producing per-request RPC contexts against these ports.
    pub fn context_builder(&self) -> ContextBuilder {
        ContextBuilder::new(Arc::clone(&self.users))
    }

    /// Fixture user id, for wiring and tests.
    pub fn fixture_admin_id() -> UserId {
        UserId::new("123e4567-e89b-12d3-a456-426614174000")
            .unwrap_or_else(|err| unreachable!("fixture id is valid: {err}"))
    }
}
