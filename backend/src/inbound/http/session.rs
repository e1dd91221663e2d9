//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Wraps the Actix session so handlers deal with domain records instead of
//! raw cookie entries. Lifetime rules live here: a stored record older than
//! the 30-day lifetime is treated as absent, and one older than 24 hours is
//! re-stamped on read.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use chrono::{DateTime, Utc};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, SessionRecord, SessionStatus};

pub(crate) const SESSION_RECORD_KEY: &str = "session_record";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the session record in the cookie.
    pub fn persist(&self, record: &SessionRecord) -> Result<(), Error> {
        self.0
            .insert(SESSION_RECORD_KEY, record)
            .map_err(|error| Error::wrap(format!("failed to persist session: {error}")))
    }

    /// Load the current record, applying the lifetime rules.
    ///
    /// Expired records are purged and reported as absent. Records due a
    /// refresh are re-stamped at `now` and written back, so an active user
    /// keeps their session alive indefinitely.
    pub fn load(&self, now: DateTime<Utc>) -> Result<Option<SessionRecord>, Error> {
        let record = match self.0.get::<SessionRecord>(SESSION_RECORD_KEY) {
            Ok(record) => record,
            Err(error) => {
                warn!("unreadable session record in cookie: {error}");
                self.0.remove(SESSION_RECORD_KEY);
                return Ok(None);
            }
        };
        let Some(record) = record else {
            return Ok(None);
        };
        if record.is_expired(now) {
            self.0.remove(SESSION_RECORD_KEY);
            return Ok(None);
        }
        if record.needs_refresh(now) {
            let refreshed = record.refreshed(now);
            self.persist(&refreshed)?;
            return Ok(Some(refreshed));
        }
        Ok(Some(record))
    }

    /// Resolve the session into the guard's status form.
    pub fn status(&self, now: DateTime<Utc>) -> Result<SessionStatus, Error> {
        Ok(self
            .load(now)?
            .map_or(SessionStatus::Unauthenticated, |record| {
                SessionStatus::Authenticated(record.session_user())
            }))
    }

    /// Require an authenticated record or return `401 Unauthorized`.
    pub fn require(&self, now: DateTime<Utc>) -> Result<SessionRecord, Error> {
        self.load(now)?
            .ok_or_else(|| Error::unauthorized().with_message("login required"))
    }

    /// Drop the session record.
    pub fn clear(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
