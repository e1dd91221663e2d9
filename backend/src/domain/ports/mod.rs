//! Domain ports: traits the core depends on, implemented by adapters.

pub(crate) mod macros;

pub mod login_service;
pub mod token_store;
pub mod user_repository;

pub use login_service::{FixtureLoginService, LoginService};
pub use token_store::{InMemoryTokenStore, TokenStore, TokenStoreError};
pub use user_repository::{InMemoryUserRepository, UserPersistenceError, UserRepository};
