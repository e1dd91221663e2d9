//! Named procedure registry and dispatch.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::error::{ApiResult, Error};

use super::codec::WireEnvelope;
use super::context::RpcContext;
use super::middleware::{
    Endpoint, Middleware, Next, NormalizeRequest, RequestLogger, RequireAuth, RpcRequest, Timing,
};

/// A named RPC handler.
#[async_trait]
pub trait Procedure: Send + Sync {
    /// Registered name, e.g. `health.ping`.
    fn name(&self) -> &'static str;

    /// Whether the call must carry an authenticated session.
    fn protected(&self) -> bool {
        true
    }

    /// Handle a decoded payload.
    async fn call(&self, ctx: &RpcContext, payload: Value) -> ApiResult<WireEnvelope>;
}

/// Dispatches calls through the middleware chain to registered procedures.
pub struct Router {
    base: Vec<Arc<dyn Middleware>>,
    procedures: BTreeMap<&'static str, Arc<dyn Procedure>>,
}

impl Router {
    /// Router with the standard chain: normalize, timing, logging.
    /// Protected procedures additionally run the auth step.
    pub fn new() -> Self {
        Self {
            base: vec![
                Arc::new(NormalizeRequest),
                Arc::new(Timing::default()),
                Arc::new(RequestLogger),
            ],
            procedures: BTreeMap::new(),
        }
    }

    /// Register a procedure under its name. Re-registering a name replaces
    /// the previous handler.
    #[must_use]
    pub fn register(mut self, procedure: Arc<dyn Procedure>) -> Self {
        self.procedures.insert(procedure.name(), procedure);
        self
    }

    /// Registered procedure names, sorted.
    pub fn procedure_names(&self) -> Vec<&'static str> {
        self.procedures.keys().copied().collect()
    }

    /// Run a call through the chain to its procedure.
    pub async fn dispatch(
        &self,
        procedure: &str,
        payload: Value,
        ctx: RpcContext,
    ) -> ApiResult<WireEnvelope> {
        let endpoint = Dispatch {
            procedures: &self.procedures,
        };
        // The auth step must run after normalize so the looked-up name is
        // clean, but before the handler; lookup inside the endpoint would
        // leak whether a protected procedure exists. Resolve the target up
        // front on the trimmed name instead.
        let target = self.procedures.get(procedure.trim());
        let mut steps = self.base.clone();
        if target.is_none_or(|procedure| procedure.protected()) {
            steps.push(Arc::new(RequireAuth));
        }
        Next::new(&steps, &endpoint)
            .run(RpcRequest {
                procedure: procedure.to_owned(),
                payload,
                ctx,
            })
            .await
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

struct Dispatch<'a> {
    procedures: &'a BTreeMap<&'static str, Arc<dyn Procedure>>,
}

#[async_trait]
impl Endpoint for Dispatch<'_> {
    async fn call(&self, request: RpcRequest) -> ApiResult<WireEnvelope> {
        let Some(procedure) = self.procedures.get(request.procedure.as_str()) else {
            return Err(Error::not_found()
                .with_message(format!("unknown procedure: {}", request.procedure)));
        };
        procedure.call(&request.ctx, request.payload).await
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::error::ErrorKind;
    use crate::domain::ports::InMemoryUserRepository;
    use crate::domain::role::Role;
    use crate::domain::session::{SessionStatus, SessionUser};
    use crate::domain::user::{Email, User, UserId};
    use crate::rpc::context::ContextBuilder;

    struct Ping;

    #[async_trait]
    impl Procedure for Ping {
        fn name(&self) -> &'static str {
            "health.ping"
        }

        fn protected(&self) -> bool {
            false
        }

        async fn call(&self, _ctx: &RpcContext, _payload: Value) -> ApiResult<WireEnvelope> {
            Ok(WireEnvelope::plain(serde_json::json!({"pong": true})))
        }
    }

    struct WhoAmI;

    #[async_trait]
    impl Procedure for WhoAmI {
        fn name(&self) -> &'static str {
            "auth.me"
        }

        async fn call(&self, ctx: &RpcContext, _payload: Value) -> ApiResult<WireEnvelope> {
            let user = ctx.require_user()?;
            Ok(WireEnvelope::plain(serde_json::json!({"name": user.name()})))
        }
    }

    fn router() -> Router {
        Router::new()
            .register(Arc::new(Ping))
            .register(Arc::new(WhoAmI))
    }

    async fn anonymous_ctx() -> RpcContext {
        ContextBuilder::new(Arc::new(InMemoryUserRepository::default()))
            .build(SessionStatus::Unauthenticated)
            .await
            .expect("context build")
    }

    async fn authenticated_ctx() -> RpcContext {
        let user = User::new(
            UserId::random(),
            "Ada",
            Email::new("ada@example.com").expect("valid email"),
            Role::User,
        );
        let session = SessionStatus::Authenticated(SessionUser {
            id: user.id().clone(),
            role: user.role(),
        });
        ContextBuilder::new(Arc::new(InMemoryUserRepository::with_users([user])))
            .build(session)
            .await
            .expect("context build")
    }

    #[tokio::test]
    async fn public_procedure_runs_without_a_session() {
        let result = router()
            .dispatch("health.ping", Value::Null, anonymous_ctx().await)
            .await
            .expect("dispatch");
        assert_eq!(result.json, serde_json::json!({"pong": true}));
    }

    #[tokio::test]
    async fn protected_procedure_rejects_anonymous_calls() {
        let err = router()
            .dispatch("auth.me", Value::Null, anonymous_ctx().await)
            .await
            .expect_err("anonymous call must fail");
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn protected_procedure_sees_the_user() {
        let result = router()
            .dispatch("auth.me", Value::Null, authenticated_ctx().await)
            .await
            .expect("dispatch");
        assert_eq!(result.json, serde_json::json!({"name": "Ada"}));
    }

    #[tokio::test]
    async fn unknown_procedure_maps_to_not_found() {
        let err = router()
            .dispatch("nope.nothing", Value::Null, authenticated_ctx().await)
            .await
            .expect_err("unknown procedure must fail");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn unknown_procedure_requires_auth_first() {
        // An anonymous probe for a missing name gets 401, not 404, so the
        // registry's contents are not observable without a session.
        let err = router()
            .dispatch("nope.nothing", Value::Null, anonymous_ctx().await)
            .await
            .expect_err("anonymous probe must fail");
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn names_are_trimmed_before_lookup() {
        let result = router()
            .dispatch("  health.ping ", Value::Null, anonymous_ctx().await)
            .await
            .expect("dispatch");
        assert_eq!(result.json, serde_json::json!({"pong": true}));
    }
}
