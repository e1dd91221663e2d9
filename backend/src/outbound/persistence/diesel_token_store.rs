//! PostgreSQL-backed `TokenStore` adapter.
//!
//! Lookup order matches the port contract: the user record's own token
//! wins, then the linked account's access token.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::UserId;
use crate::domain::ports::{TokenStore, TokenStoreError};

use super::pool::{DbPool, PoolError};
use super::schema::{account_tokens, users};

/// Diesel-backed implementation of the `TokenStore` port.
#[derive(Clone)]
pub struct DieselTokenStore {
    pool: DbPool,
}

impl DieselTokenStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> TokenStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            TokenStoreError::unavailable(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> TokenStoreError {
    TokenStoreError::unavailable(error.to_string())
}

#[async_trait]
impl TokenStore for DieselTokenStore {
    async fn access_token(&self, user_id: &UserId) -> Result<Option<String>, TokenStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *user_id.as_uuid();

        let user_token: Option<Option<String>> = users::table
            .filter(users::id.eq(id))
            .select(users::token)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        if let Some(Some(token)) = user_token {
            return Ok(Some(token));
        }

        let account_token: Option<String> = account_tokens::table
            .filter(account_tokens::user_id.eq(id))
            .select(account_tokens::access_token)
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(account_token)
    }

    async fn refresh(&self, user_id: &UserId) -> Result<String, TokenStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let id = *user_id.as_uuid();
        let token = uuid::Uuid::new_v4().to_string();

        let updated = diesel::update(users::table.filter(users::id.eq(id)))
            .set(users::token.eq(Some(token.clone())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if updated == 0 {
            return Err(TokenStoreError::missing(user_id.to_string()));
        }
        Ok(token)
    }
}
