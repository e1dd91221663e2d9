//! PostgreSQL-backed `LoginService` adapter.
//!
//! Looks up the user row by email and compares a SHA-256 digest of the
//! presented password against the stored hex digest. The digest never
//! leaves this module.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use sha2::{Digest, Sha256};

use crate::domain::error::{ApiResult, Error};
use crate::domain::ports::LoginService;
use crate::domain::{LoginCredentials, User};

use super::models::UserRow;
use super::pool::DbPool;
use super::schema::users;

/// Diesel-backed implementation of the `LoginService` port.
#[derive(Clone)]
pub struct DieselLoginService {
    pool: DbPool,
}

impl DieselLoginService {
    /// Create a new service with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Compare a password against a stored hex-encoded SHA-256 digest.
///
/// Comparison is done digest-to-digest so a malformed stored value can
/// never match.
fn digest_matches(password: &str, stored_hex: &str) -> bool {
    let presented = hex::encode(Sha256::digest(password.as_bytes()));
    let Ok(stored) = hex::decode(stored_hex) else {
        return false;
    };
    hex::encode(stored) == presented
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> ApiResult<User> {
        let mut conn = self.pool.get().await.map_err(Error::wrap)?;
        let email = credentials.email().as_ref().to_owned();
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(Error::wrap)?;

        // Same rejection for unknown email and wrong password.
        let invalid = || Error::unauthorized().with_message("invalid credentials");
        let row = row.ok_or_else(invalid)?;
        if !digest_matches(credentials.password(), &row.password_digest) {
            return Err(invalid());
        }
        row.into_user().map_err(Error::wrap)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn digest_hex(password: &str) -> String {
        hex::encode(Sha256::digest(password.as_bytes()))
    }

    #[test]
    fn matching_password_is_accepted() {
        assert!(digest_matches("password", &digest_hex("password")));
    }

    #[rstest]
    #[case("wrong")]
    #[case("")]
    #[case("Password")]
    fn wrong_password_is_rejected(#[case] presented: &str) {
        assert!(!digest_matches(presented, &digest_hex("password")));
    }

    #[rstest]
    #[case("not-hex-at-all")]
    #[case("")]
    #[case("abcd")]
    fn malformed_stored_digest_never_matches(#[case] stored: &str) {
        assert!(!digest_matches("password", stored));
    }
}
