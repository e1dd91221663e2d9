//! Authentication endpoints.
//!
//! ```text
//! POST /api/auth/login    Credential sign-in, sets the session cookie
//! POST /api/auth/logout   Clears the session
//! GET  /api/auth/session  Current session status (re-stamps stale records)
//! ```

use actix_web::{HttpResponse, get, post, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::domain::{Error, LoginCredentials, SessionRecord, SessionStatus, SessionUser};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Login request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Session status response body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

impl SessionResponse {
    fn from_status(status: &SessionStatus) -> Self {
        match status {
            SessionStatus::Loading => Self {
                status: "loading",
                user: None,
            },
            SessionStatus::Unauthenticated => Self {
                status: "unauthenticated",
                user: None,
            },
            SessionStatus::Authenticated(user) => Self {
                status: "authenticated",
                user: Some(user.clone()),
            },
        }
    }
}

/// Sign in with email and password.
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(|err| Error::bad_request().with_message(err.to_string()))?;
    let user = state.login.authenticate(&credentials).await?;

    let record = SessionRecord::new(user.id().clone(), user.role(), Utc::now());
    session.persist(&record)?;

    Ok(HttpResponse::Ok().json(SessionResponse {
        status: "authenticated",
        user: Some(record.session_user()),
    }))
}

/// Clear the session cookie.
#[post("/auth/logout")]
pub async fn logout(session: SessionContext) -> ApiResult<HttpResponse> {
    session.clear();
    Ok(HttpResponse::Ok().json(SessionResponse {
        status: "unauthenticated",
        user: None,
    }))
}

/// Report the current session status.
#[get("/auth/session")]
pub async fn current_session(session: SessionContext) -> ApiResult<HttpResponse> {
    let status = session.status(Utc::now())?;
    Ok(HttpResponse::Ok().json(SessionResponse::from_status(&status)))
}
