//! Starter procedures registered by the server wiring.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;

use crate::domain::error::{ApiResult, Error};
use crate::domain::user::User;

use super::codec::{self, TypeTag, WireEnvelope};
use super::context::RpcContext;
use super::router::{Procedure, Router};

/// Client-facing projection of a user record.
///
/// The stored record also carries the downstream bearer token; that must
/// never cross the RPC boundary, so procedures serialize this view instead
/// of the full record.
fn public_view(user: &User) -> Value {
    serde_json::json!({
        "id": user.id().as_ref(),
        "name": user.name(),
        "email": user.email().as_ref(),
        "role": user.role(),
    })
}

/// Router pre-loaded with the starter procedures.
pub fn starter_router() -> Router {
    Router::new()
        .register(std::sync::Arc::new(HealthPing))
        .register(std::sync::Arc::new(AuthMe))
        .register(std::sync::Arc::new(UsersList))
}

/// `health.ping` — liveness probe; public.
///
/// Returns the server time as a tagged datetime so clients can check
/// clock skew.
pub struct HealthPing;

#[async_trait]
impl Procedure for HealthPing {
    fn name(&self) -> &'static str {
        "health.ping"
    }

    fn protected(&self) -> bool {
        false
    }

    async fn call(&self, _ctx: &RpcContext, _payload: Value) -> ApiResult<WireEnvelope> {
        let body = serde_json::json!({
            "pong": true,
            "time": Utc::now().to_rfc3339(),
        });
        let mut tags = BTreeMap::new();
        tags.insert("time".to_owned(), TypeTag::Datetime);
        codec::encode(body, tags)
    }
}

/// `auth.me` — the authenticated user's own record.
pub struct AuthMe;

#[async_trait]
impl Procedure for AuthMe {
    fn name(&self) -> &'static str {
        "auth.me"
    }

    async fn call(&self, ctx: &RpcContext, _payload: Value) -> ApiResult<WireEnvelope> {
        let user = ctx.require_user()?;
        let mut tags = BTreeMap::new();
        tags.insert("id".to_owned(), TypeTag::Uuid);
        codec::encode(public_view(user), tags)
    }
}

/// `users.list` — every known user, ordered by name.
pub struct UsersList;

#[async_trait]
impl Procedure for UsersList {
    fn name(&self) -> &'static str {
        "users.list"
    }

    async fn call(&self, ctx: &RpcContext, _payload: Value) -> ApiResult<WireEnvelope> {
        let users = ctx.users().list().await.map_err(Error::wrap)?;
        let mut tags = BTreeMap::new();
        for index in 0..users.len() {
            tags.insert(format!("users.{index}.id"), TypeTag::Uuid);
        }
        let body = serde_json::json!({
            "users": users.iter().map(public_view).collect::<Vec<_>>(),
        });
        codec::encode(body, tags)
    }
}
