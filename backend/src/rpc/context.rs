//! Per-request RPC context.
//!
//! The context is built fresh for every request and dropped afterwards;
//! nothing in it outlives the call. It aggregates the resolved session,
//! the loaded user record, the repository handle, and application
//! constants, so procedures never reach for globals.

use std::sync::Arc;

use crate::constants::Constants;
use crate::domain::error::{ApiResult, Error};
use crate::domain::ports::UserRepository;
use crate::domain::session::{SessionStatus, SessionUser};
use crate::domain::user::User;

/// Request-scoped dependencies handed to middleware and procedures.
#[derive(Clone)]
pub struct RpcContext {
    session: SessionStatus,
    user: Option<User>,
    users: Arc<dyn UserRepository>,
    constants: Constants,
}

impl RpcContext {
    /// Resolved session status for this request.
    pub const fn session(&self) -> &SessionStatus {
        &self.session
    }

    /// Session identity, when authenticated.
    pub const fn session_user(&self) -> Option<&SessionUser> {
        self.session.user()
    }

    /// Loaded user record, when the session resolved to a stored user.
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// User persistence handle.
    pub fn users(&self) -> &Arc<dyn UserRepository> {
        &self.users
    }

    /// Application constants.
    pub const fn constants(&self) -> &Constants {
        &self.constants
    }

    /// The authenticated user, or an unauthorized error.
    ///
    /// Protected procedures run behind the auth middleware, so this only
    /// fails if a procedure is mis-registered as public.
    pub fn require_user(&self) -> ApiResult<&User> {
        self.user
            .as_ref()
            .ok_or_else(|| Error::unauthorized().with_message("authentication required"))
    }
}

/// Builds an [`RpcContext`] from the resolved session.
#[derive(Clone)]
pub struct ContextBuilder {
    users: Arc<dyn UserRepository>,
    constants: Constants,
}

impl ContextBuilder {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            constants: Constants::new(),
        }
    }

    /// Resolve the session into a full context, loading the user record
    /// for authenticated sessions.
    ///
    /// A session pointing at a user the repository no longer knows is
    /// treated as unauthenticated rather than an error; the record may
    /// have been deleted after the cookie was issued.
    pub async fn build(&self, session: SessionStatus) -> ApiResult<RpcContext> {
        let user = match session.user() {
            Some(session_user) => self
                .users
                .find_by_id(&session_user.id)
                .await
                .map_err(Error::wrap)?,
            None => None,
        };
        let session = match (&session, &user) {
            (SessionStatus::Authenticated(_), None) => SessionStatus::Unauthenticated,
            _ => session,
        };
        Ok(RpcContext {
            session,
            user,
            users: Arc::clone(&self.users),
            constants: self.constants.clone(),
        })
    }
}
