//! Outbound HTTP client for downstream services.
//!
//! Injects a bearer token from a [`TokenProvider`] and, when a request
//! comes back 401 or 403, forces a token refresh and retries exactly once.
//! A second rejection is returned to the caller as an error. The wire is
//! behind the [`Transport`] trait so the retry path tests without a
//! network.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::domain::error::{ApiResult, Error, ErrorKind};

/// Supplies and refreshes the bearer token attached to outbound calls.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current token, if one is held.
    async fn access_token(&self) -> ApiResult<Option<String>>;

    /// Force a refresh and return the replacement token.
    async fn refresh(&self) -> ApiResult<String>;
}

/// A single outbound HTTP exchange.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

/// Status and decoded body of an outbound response.
#[derive(Debug, Clone)]
pub struct OutboundResponse {
    pub status: u16,
    pub body: Value,
}

/// The wire. Implementations must not retry on their own.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: OutboundRequest) -> ApiResult<OutboundResponse>;
}

/// Production transport backed by `reqwest`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutboundRequest) -> ApiResult<OutboundResponse> {
        let mut builder = self.client.request(request.method, request.url);
        if let Some(token) = request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = request.body {
            builder = builder.json(&body);
        }
        let response = builder
            .send()
            .await
            .map_err(|err| Error::bad_gateway().with_message(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response.json().await.unwrap_or(Value::Null);
        Ok(OutboundResponse { status, body })
    }
}

/// Token-aware client for a single downstream base URL.
pub struct ApiClient {
    base_url: Url,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenProvider>,
}

impl ApiClient {
    pub fn new(base_url: Url, transport: Arc<dyn Transport>, tokens: Arc<dyn TokenProvider>) -> Self {
        Self {
            base_url,
            transport,
            tokens,
        }
    }

    /// GET a path relative to the base URL.
    pub async fn get(&self, path: &str) -> ApiResult<Value> {
        self.execute(Method::GET, path, None).await
    }

    /// POST a JSON body to a path relative to the base URL.
    pub async fn post(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.execute(Method::POST, path, Some(body)).await
    }

    async fn execute(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Value> {
        let url = self
            .base_url
            .join(path)
            .map_err(|err| Error::bad_request().with_message(format!("invalid path: {err}")))?;
        let bearer = self.tokens.access_token().await?;

        let response = self
            .transport
            .send(OutboundRequest {
                method: method.clone(),
                url: url.clone(),
                bearer,
                body: body.clone(),
            })
            .await?;

        if !is_auth_failure(response.status) {
            return finish(response);
        }

        // One forced refresh, one retry; a second rejection stands.
        debug!(%url, status = response.status, "auth failure, refreshing token");
        let fresh = self.tokens.refresh().await?;
        let retried = self
            .transport
            .send(OutboundRequest {
                method,
                url: url.clone(),
                bearer: Some(fresh),
                body,
            })
            .await?;
        if is_auth_failure(retried.status) {
            warn!(%url, status = retried.status, "auth failure after token refresh");
        }
        finish(retried)
    }
}

const fn is_auth_failure(status: u16) -> bool {
    matches!(status, 401 | 403)
}

fn finish(response: OutboundResponse) -> ApiResult<Value> {
    if (200..300).contains(&response.status) {
        return Ok(response.body);
    }
    // Downstream services speak the same envelope; fall back to the
    // status code when the body is something else.
    if let Ok(error) = serde_json::from_value::<Error>(response.body.clone()) {
        return Err(error);
    }
    Err(Error::new(ErrorKind::from_status(response.status)))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::ErrorKind;
    use rstest::rstest;

    #[derive(Default)]
    struct StubTokens {
        refreshes: AtomicUsize,
    }

    #[async_trait]
    impl TokenProvider for StubTokens {
        async fn access_token(&self) -> ApiResult<Option<String>> {
            Ok(Some("stale-token".to_owned()))
        }

        async fn refresh(&self) -> ApiResult<String> {
            self.refreshes.fetch_add(1, Ordering::Relaxed);
            Ok("fresh-token".to_owned())
        }
    }

    /// Replays a scripted sequence of statuses and records each request.
    struct StubTransport {
        statuses: Mutex<Vec<u16>>,
        seen: Mutex<Vec<OutboundRequest>>,
    }

    impl StubTransport {
        fn scripted(statuses: Vec<u16>) -> Self {
            Self {
                statuses: Mutex::new(statuses),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn bearers(&self) -> Vec<Option<String>> {
            self.seen
                .lock()
                .expect("seen lock")
                .iter()
                .map(|request| request.bearer.clone())
                .collect()
        }

        fn request_count(&self) -> usize {
            self.seen.lock().expect("seen lock").len()
        }
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(&self, request: OutboundRequest) -> ApiResult<OutboundResponse> {
            self.seen.lock().expect("seen lock").push(request);
            let mut statuses = self.statuses.lock().expect("status lock");
            let status = if statuses.is_empty() {
                200
            } else {
                statuses.remove(0)
            };
            Ok(OutboundResponse {
                status,
                body: serde_json::json!({"ok": status < 400}),
            })
        }
    }

    fn client(statuses: Vec<u16>) -> (ApiClient, Arc<StubTransport>, Arc<StubTokens>) {
        let transport = Arc::new(StubTransport::scripted(statuses));
        let tokens = Arc::new(StubTokens::default());
        let base = Url::parse("https://downstream.example.com/api/").expect("valid url");
        (
            ApiClient::new(base, Arc::clone(&transport) as _, Arc::clone(&tokens) as _),
            transport,
            tokens,
        )
    }

    #[tokio::test]
    async fn success_passes_through_without_refresh() {
        let (client, transport, tokens) = client(vec![200]);
        let body = client.get("widgets").await.expect("success");
        assert_eq!(body, serde_json::json!({"ok": true}));
        assert_eq!(transport.request_count(), 1);
        assert_eq!(tokens.refreshes.load(Ordering::Relaxed), 0);
        assert_eq!(transport.bearers(), vec![Some("stale-token".to_owned())]);
    }

    #[rstest]
    #[case(401)]
    #[case(403)]
    #[tokio::test]
    async fn auth_failure_refreshes_and_retries_once(#[case] status: u16) {
        let (client, transport, tokens) = client(vec![status, 200]);
        let body = client.get("widgets").await.expect("retry succeeds");
        assert_eq!(body, serde_json::json!({"ok": true}));
        assert_eq!(transport.request_count(), 2);
        assert_eq!(tokens.refreshes.load(Ordering::Relaxed), 1);
        assert_eq!(
            transport.bearers(),
            vec![
                Some("stale-token".to_owned()),
                Some("fresh-token".to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn second_auth_failure_is_not_retried() {
        let (client, transport, tokens) = client(vec![401, 401]);
        let err = client.get("widgets").await.expect_err("second 401 stands");
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(transport.request_count(), 2);
        assert_eq!(tokens.refreshes.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn non_auth_errors_do_not_trigger_a_retry() {
        let (client, transport, tokens) = client(vec![503]);
        let err = client.get("widgets").await.expect_err("503 surfaces");
        assert_eq!(err.kind(), ErrorKind::ServiceUnavailable);
        assert_eq!(transport.request_count(), 1);
        assert_eq!(tokens.refreshes.load(Ordering::Relaxed), 0);
    }

    #[tokio::test]
    async fn downstream_envelopes_are_preserved() {
        struct EnvelopeTransport;

        #[async_trait]
        impl Transport for EnvelopeTransport {
            async fn send(&self, _request: OutboundRequest) -> ApiResult<OutboundResponse> {
                Ok(OutboundResponse {
                    status: 423,
                    body: serde_json::json!({"error": "row is locked", "code": 423}),
                })
            }
        }

        let base = Url::parse("https://downstream.example.com/api/").expect("valid url");
        let client = ApiClient::new(
            base,
            Arc::new(EnvelopeTransport),
            Arc::new(StubTokens::default()),
        );
        let err = client.get("widgets").await.expect_err("423 surfaces");
        assert_eq!(err.kind(), ErrorKind::Locked);
        assert_eq!(err.message(), "row is locked");
    }
}
