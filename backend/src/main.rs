//! Backend entry-point: wires the auth, RPC, and health endpoints.

mod server;

use std::net::SocketAddr;

use actix_web::web;
use mockable::DefaultEnv;
use mockable::Env;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::inbound::http::session_config::{BuildMode, session_settings_from_env};
use backend::outbound::persistence::{DbPool, PoolConfig};
use server::ServerConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let env = DefaultEnv::default();
    let session = session_settings_from_env(&env, BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;

    let bind_addr: SocketAddr = env
        .string("BIND_ADDR")
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned())
        .parse()
        .map_err(std::io::Error::other)?;

    let mut config = ServerConfig::new(session, bind_addr);
    if let Some(origin) = env.string("CORS_ALLOWED_ORIGIN") {
        config = config.with_cors_origin(origin);
    }
    match env.string("DATABASE_URL") {
        Some(database_url) => {
            let pool = DbPool::new(PoolConfig::new(database_url))
                .await
                .map_err(std::io::Error::other)?;
            config = config.with_db_pool(pool);
        }
        None => {
            warn!("DATABASE_URL not set; serving fixture data from memory");
        }
    }

    let health_state = web::Data::new(HealthState { ready: true });
    let server = server::create_server(health_state, config)?;
    info!(addr = %bind_addr, "server listening");
    server.await
}
