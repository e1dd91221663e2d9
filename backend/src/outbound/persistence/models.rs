//! Row types bridging the Diesel schema and the domain model.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::ports::UserPersistenceError;
use crate::domain::{Role, User};

use super::schema::{account_tokens, users};

/// Full `users` row as selected from the database.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub password_digest: String,
    pub token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    /// Convert the row into a domain user.
    ///
    /// The digest never crosses into the domain model.
    pub fn into_user(self) -> Result<User, UserPersistenceError> {
        let role: Role = self
            .role
            .parse()
            .map_err(|err| UserPersistenceError::invalid_record(format!("{err}")))?;
        let user = User::try_from_strings(self.id.to_string(), self.name, self.email, role)
            .map_err(|err| UserPersistenceError::invalid_record(format!("{err}")))?;
        Ok(match self.token {
            Some(token) => user.with_token(token),
            None => user,
        })
    }
}

/// Insertable/upsertable `users` row built from a domain user.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: uuid::Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub token: Option<String>,
}

impl NewUserRow {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: *user.id().as_uuid(),
            name: user.name().to_owned(),
            email: user.email().as_ref().to_owned(),
            role: user.role().as_str().to_owned(),
            token: user.token().map(str::to_owned),
        }
    }
}

/// `account_tokens` row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = account_tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccountTokenRow {
    pub user_id: uuid::Uuid,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
