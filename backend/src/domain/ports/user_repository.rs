//! Driven port for user persistence.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::user::{Email, User, UserId};

use super::macros::define_port_error;

define_port_error! {
    /// Failures surfaced by user persistence adapters.
    pub enum UserPersistenceError {
        /// The backing store could not be reached.
        Unavailable { message: String } => "user store unavailable: {message}",
        /// A query failed after the store was reached.
        Query { message: String } => "user query failed: {message}",
        /// The adapter returned a row the domain model rejects.
        InvalidRecord { message: String } => "invalid user record: {message}",
    }
}

/// Domain port for loading and storing users.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by id.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Look up a user by email address.
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError>;

    /// All users, ordered by name.
    async fn list(&self) -> Result<Vec<User>, UserPersistenceError>;

    /// Insert or replace a user record.
    async fn upsert(&self, user: User) -> Result<(), UserPersistenceError>;
}

/// Map-backed repository used in development and tests.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    /// Repository pre-populated with the given users.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.id().clone(), user))
            .collect();
        Self {
            users: RwLock::new(users),
        }
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, HashMap<UserId, User>>, UserPersistenceError>
    {
        self.users
            .read()
            .map_err(|_| UserPersistenceError::unavailable("user map lock poisoned"))
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.read()?.get(id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.read()?.values().find(|user| user.email() == email).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        let mut users: Vec<User> = self.read()?.values().cloned().collect();
        users.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(users)
    }

    async fn upsert(&self, user: User) -> Result<(), UserPersistenceError> {
        self.users
            .write()
            .map_err(|_| UserPersistenceError::unavailable("user map lock poisoned"))?
            .insert(user.id().clone(), user);
        Ok(())
    }
}
