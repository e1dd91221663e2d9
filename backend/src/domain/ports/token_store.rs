//! Driven port for downstream service tokens.
//!
//! A token may live directly on the user record or on the user's linked
//! provider account; lookups check the user first and fall back to the
//! account.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::user::UserId;

use super::macros::define_port_error;

define_port_error! {
    /// Failures surfaced by token store adapters.
    pub enum TokenStoreError {
        /// The backing store could not be reached.
        Unavailable { message: String } => "token store unavailable: {message}",
        /// No token exists for the user on either record.
        Missing { user_id: String } => "no token stored for user {user_id}",
    }
}

/// Domain port resolving downstream bearer tokens for a user.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Current token for the user: the user record's token when present,
    /// otherwise the linked account's access token.
    async fn access_token(&self, user_id: &UserId) -> Result<Option<String>, TokenStoreError>;

    /// Mint and persist a replacement token for the user.
    async fn refresh(&self, user_id: &UserId) -> Result<String, TokenStoreError>;
}

/// Map-backed token store used in development and tests.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    user_tokens: RwLock<HashMap<UserId, String>>,
    account_tokens: RwLock<HashMap<UserId, String>>,
}

impl InMemoryTokenStore {
    /// Store a token on the user record itself.
    pub fn set_user_token(&self, user_id: UserId, token: impl Into<String>) {
        if let Ok(mut tokens) = self.user_tokens.write() {
            tokens.insert(user_id, token.into());
        }
    }

    /// Store a token on the user's linked account.
    pub fn set_account_token(&self, user_id: UserId, token: impl Into<String>) {
        if let Ok(mut tokens) = self.account_tokens.write() {
            tokens.insert(user_id, token.into());
        }
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn access_token(&self, user_id: &UserId) -> Result<Option<String>, TokenStoreError> {
        let user_token = self
            .user_tokens
            .read()
            .map_err(|_| TokenStoreError::unavailable("token map lock poisoned"))?
            .get(user_id)
            .cloned();
        if user_token.is_some() {
            return Ok(user_token);
        }
        Ok(self
            .account_tokens
            .read()
            .map_err(|_| TokenStoreError::unavailable("token map lock poisoned"))?
            .get(user_id)
            .cloned())
    }

    async fn refresh(&self, user_id: &UserId) -> Result<String, TokenStoreError> {
        let token = uuid::Uuid::new_v4().to_string();
        self.user_tokens
            .write()
            .map_err(|_| TokenStoreError::unavailable("token map lock poisoned"))?
            .insert(user_id.clone(), token.clone());
        Ok(token)
    }
}
