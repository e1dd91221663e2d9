//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_cors::Cors;
use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::{App, HttpServer, web};

use backend::Trace;
use backend::domain::session::SESSION_LIFETIME_SECS;
use backend::inbound::http::auth::{current_session, login, logout};
use backend::inbound::http::health::{HealthState, live, ready};
use backend::inbound::http::rpc::call_procedure;
use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{DieselLoginService, DieselTokenStore, DieselUserRepository};
use backend::rpc::starter_router;

/// Build the shared HTTP state from the configured pool, falling back to
/// the in-memory fixtures when none is attached.
fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let state = match &config.db_pool {
        Some(pool) => HttpState::new(
            Arc::new(DieselLoginService::new(pool.clone())),
            Arc::new(DieselUserRepository::new(pool.clone())),
            Arc::new(DieselTokenStore::new(pool.clone())),
            Arc::new(starter_router()),
        ),
        None => HttpState::fixture(),
    };
    web::Data::new(state)
}

fn build_cors(origin: Option<&str>) -> Cors {
    let cors = Cors::default()
        .allowed_methods(["GET", "POST"])
        .allowed_headers([header::CONTENT_TYPE, header::ACCEPT])
        .supports_credentials()
        .max_age(3600);
    match origin {
        Some(origin) => cors.allowed_origin(origin),
        // Same-origin deployments need no cross-site access.
        None => cors,
    }
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
    cors_origin: Option<String>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
        cors_origin,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(
                actix_web::cookie::time::Duration::seconds(SESSION_LIFETIME_SECS),
            ),
        )
        .build();

    let api = web::scope("/api")
        .wrap(session)
        .wrap(build_cors(cors_origin.as_deref()))
        .service(login)
        .service(logout)
        .service(current_session)
        .service(call_procedure);

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live)
}

/// Construct an Actix HTTP server using the provided health state and
/// configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let http_state = build_http_state(&config);
    let ServerConfig {
        session,
        bind_addr,
        db_pool: _,
        cors_origin,
    } = config;
    let key = session.key;
    let cookie_secure = session.cookie_secure;
    let same_site = session.same_site;

    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
            cors_origin: cors_origin.clone(),
        })
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}
