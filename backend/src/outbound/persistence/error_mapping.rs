//! Shared mapping from pool and Diesel failures to port errors.

use tracing::debug;

use crate::domain::ports::UserPersistenceError;

use super::pool::PoolError;

pub(super) fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPersistenceError::unavailable(message)
        }
    }
}

pub(super) fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::unavailable("database connection error")
        }
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        _ => UserPersistenceError::query("database error"),
    }
}
