//! RPC endpoint.
//!
//! ```text
//! POST /api/rpc/{procedure}  Dispatch a named procedure call
//! ```
//!
//! The body, when present, is a wire envelope; the response is one too.
//! Errors surface as the JSON error envelope with the bound status code.

use actix_web::{HttpResponse, post, web};
use chrono::Utc;
use serde_json::Value;

use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::rpc::codec::{self, WireEnvelope};

/// Dispatch a procedure call through the middleware chain.
#[post("/rpc/{procedure}")]
pub async fn call_procedure(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: Option<web::Json<WireEnvelope>>,
) -> ApiResult<HttpResponse> {
    let status = session.status(Utc::now())?;
    let envelope = payload.map_or_else(
        || WireEnvelope::plain(Value::Null),
        web::Json::into_inner,
    );
    let input = codec::decode(envelope)?;

    let ctx = state.context_builder().build(status).await?;
    let result = state.router.dispatch(&path, input, ctx).await?;
    Ok(HttpResponse::Ok().json(result))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::inbound::http::auth::login;
    use crate::inbound::http::test_utils::test_session_middleware;
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};

    fn fixture_app() -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(HttpState::fixture()))
            .wrap(test_session_middleware())
            .service(web::scope("/api").service(login).service(call_procedure))
    }

    async fn sign_in(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
    ) -> Cookie<'static> {
        let res = test::call_service(
            app,
            test::TestRequest::post()
                .uri("/api/auth/login")
                .set_json(serde_json::json!({
                    "email": "admin@example.com",
                    "password": "password",
                }))
                .to_request(),
        )
        .await;
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie set")
            .into_owned()
    }

    #[actix_web::test]
    async fn public_procedure_answers_without_a_session() {
        let app = test::init_service(fixture_app()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/rpc/health.ping")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["json"]["pong"], true);
        assert_eq!(body["meta"]["values"]["time"], "datetime");
    }

    #[actix_web::test]
    async fn protected_procedure_requires_a_session() {
        let app = test::init_service(fixture_app()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post().uri("/api/rpc/auth.me").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["code"], 401);
    }

    #[actix_web::test]
    async fn signed_in_caller_reaches_protected_procedures() {
        let app = test::init_service(fixture_app()).await;
        let cookie = sign_in(&app).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/rpc/auth.me")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["json"]["name"], "Admin");
        assert_eq!(body["json"]["role"], "admin");
    }

    #[actix_web::test]
    async fn unknown_procedure_is_not_found_for_signed_in_callers() {
        let app = test::init_service(fixture_app()).await;
        let cookie = sign_in(&app).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/rpc/no.such.procedure")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["code"], 404);
    }

    #[actix_web::test]
    async fn malformed_wire_meta_is_a_bad_request() {
        let app = test::init_service(fixture_app()).await;
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/rpc/health.ping")
                .set_json(serde_json::json!({
                    "json": {"when": "not-a-date"},
                    "meta": {"values": {"when": "datetime"}},
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["code"], 400);
    }
}
