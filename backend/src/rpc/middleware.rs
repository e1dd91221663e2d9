//! Linear RPC middleware chain.
//!
//! Each step wraps the next and may short-circuit with an [`Error`]; the
//! final link invokes the procedure itself. The chain is rebuilt per
//! dispatch from shared `Arc` steps, so steps hold no request state.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::error::{ApiResult, Error};

use super::codec::WireEnvelope;
use super::context::RpcContext;

/// A single RPC invocation travelling down the chain.
pub struct RpcRequest {
    /// Procedure name from the URL path.
    pub procedure: String,
    /// Decoded JSON input.
    pub payload: Value,
    /// Per-request context.
    pub ctx: RpcContext,
}

/// Continuation invoking the remaining chain and, finally, the endpoint.
pub struct Next<'a> {
    steps: &'a [Arc<dyn Middleware>],
    endpoint: &'a dyn Endpoint,
}

impl<'a> Next<'a> {
    pub fn new(steps: &'a [Arc<dyn Middleware>], endpoint: &'a dyn Endpoint) -> Self {
        Self { steps, endpoint }
    }

    /// Run the rest of the chain with the given request.
    pub fn run(self, request: RpcRequest) -> BoxFuture<'a, ApiResult<WireEnvelope>> {
        Box::pin(async move {
            match self.steps.split_first() {
                Some((step, rest)) => {
                    step.handle(request, Next::new(rest, self.endpoint)).await
                }
                None => self.endpoint.call(request).await,
            }
        })
    }
}

/// Terminal handler at the end of the chain.
#[async_trait]
pub trait Endpoint: Send + Sync {
    async fn call(&self, request: RpcRequest) -> ApiResult<WireEnvelope>;
}

/// One link in the chain.
#[async_trait]
pub trait Middleware: Send + Sync {
    async fn handle(&self, request: RpcRequest, next: Next<'_>) -> ApiResult<WireEnvelope>;
}

/// Normalizes the inbound request before anything else sees it.
///
/// Trims whitespace around the procedure name and replaces an absent
/// payload with an empty object so procedures can deserialize uniformly.
#[derive(Debug, Default, Clone, Copy)]
pub struct NormalizeRequest;

#[async_trait]
impl Middleware for NormalizeRequest {
    async fn handle(&self, mut request: RpcRequest, next: Next<'_>) -> ApiResult<WireEnvelope> {
        let trimmed = request.procedure.trim();
        if trimmed.is_empty() {
            return Err(Error::bad_request().with_message("missing procedure name"));
        }
        if trimmed.len() != request.procedure.len() {
            request.procedure = trimmed.to_owned();
        }
        if request.payload.is_null() {
            request.payload = Value::Object(serde_json::Map::new());
        }
        next.run(request).await
    }
}

/// Times each call and warns when a procedure is slow.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    slow_threshold_ms: u128,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            slow_threshold_ms: 500,
        }
    }
}

#[async_trait]
impl Middleware for Timing {
    async fn handle(&self, request: RpcRequest, next: Next<'_>) -> ApiResult<WireEnvelope> {
        let procedure = request.procedure.clone();
        let started = Instant::now();
        let result = next.run(request).await;
        let elapsed_ms = started.elapsed().as_millis();
        if elapsed_ms >= self.slow_threshold_ms {
            warn!(%procedure, elapsed_ms, "slow rpc procedure");
        } else {
            info!(%procedure, elapsed_ms, "rpc timing");
        }
        result
    }
}

/// Logs each call with its outcome.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequestLogger;

#[async_trait]
impl Middleware for RequestLogger {
    async fn handle(&self, request: RpcRequest, next: Next<'_>) -> ApiResult<WireEnvelope> {
        let procedure = request.procedure.clone();
        let authenticated = request.ctx.user().is_some();
        info!(%procedure, authenticated, "rpc call");
        let result = next.run(request).await;
        match &result {
            Ok(_) => info!(%procedure, "rpc ok"),
            Err(err) => warn!(%procedure, code = err.status(), error = %err.message(), "rpc error"),
        }
        result
    }
}

/// Rejects unauthenticated calls before the procedure runs.
///
/// Placed only on protected procedures; behind it, a handler is guaranteed
/// both a session and a loaded user record.
#[derive(Debug, Default, Clone, Copy)]
pub struct RequireAuth;

#[async_trait]
impl Middleware for RequireAuth {
    async fn handle(&self, request: RpcRequest, next: Next<'_>) -> ApiResult<WireEnvelope> {
        if request.ctx.user().is_none() {
            return Err(Error::unauthorized().with_message("authentication required"));
        }
        next.run(request).await
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
    use rstest::rstest;

    struct EchoEndpoint;

    #[async_trait]
    impl Endpoint for EchoEndpoint {
        async fn call(&self, request: RpcRequest) -> ApiResult<WireEnvelope> {
            Ok(WireEnvelope::plain(serde_json::json!({
                "procedure": request.procedure,
                "payload": request.payload,
            })))
        }
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

    async fn run_chain(
        steps: Vec<Arc<dyn Middleware>>,
        procedure: &str,
        payload: Value,
        ctx: RpcContext,
    ) -> ApiResult<WireEnvelope> {
        let endpoint = EchoEndpoint;
        Next::new(&steps, &endpoint)
            .run(RpcRequest {
                procedure: procedure.to_owned(),
                payload,
                ctx,
            })
            .await
    }

    #[tokio::test]
    async fn normalize_trims_the_procedure_name() {
        let result = run_chain(
            vec![Arc::new(NormalizeRequest)],
            "  health.ping  ",
            Value::Null,
            anonymous_ctx().await,
        )
        .await
        .expect("chain result");
        assert_eq!(result.json["procedure"], "health.ping");
        assert_eq!(result.json["payload"], serde_json::json!({}));
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[tokio::test]
    async fn normalize_rejects_blank_procedure_names(#[case] name: &str) {
        let err = run_chain(
            vec![Arc::new(NormalizeRequest)],
            name,
            Value::Null,
            anonymous_ctx().await,
        )
        .await
        .expect_err("blank name must fail");
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn require_auth_blocks_anonymous_calls() {
        let err = run_chain(
            vec![Arc::new(RequireAuth)],
            "auth.me",
            Value::Null,
            anonymous_ctx().await,
        )
        .await
        .expect_err("anonymous call must fail");
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn require_auth_passes_authenticated_calls() {
        let result = run_chain(
            vec![Arc::new(RequireAuth)],
            "auth.me",
            Value::Null,
            authenticated_ctx().await,
        )
        .await
        .expect("chain result");
        assert_eq!(result.json["procedure"], "auth.me");
    }

    #[tokio::test]
    async fn full_chain_composes_in_order() {
        let steps: Vec<Arc<dyn Middleware>> = vec![
            Arc::new(NormalizeRequest),
            Arc::new(Timing::default()),
            Arc::new(RequestLogger),
            Arc::new(RequireAuth),
        ];
        let result = run_chain(
            steps,
            " users.list ",
            serde_json::json!({"page": 1}),
            authenticated_ctx().await,
        )
        .await
        .expect("chain result");
        assert_eq!(result.json["procedure"], "users.list");
        assert_eq!(result.json["payload"], serde_json::json!({"page": 1}));
    }
}
