//! Health endpoints.
//!
//! ```text
//! GET /health/live   Process is up
//! GET /health/ready  Dependencies are wired (503 otherwise)
//! ```

use actix_web::{HttpResponse, get, web};
use serde::Serialize;

/// Readiness flags set once at startup by the server wiring.
#[derive(Debug, Clone, Copy)]
pub struct HealthState {
    /// Whether a real database pool is attached (fixture mode counts as
    /// ready; it serves from memory).
    pub ready: bool,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
}

/// Liveness probe.
#[get("/health/live")]
pub async fn live() -> HttpResponse {
    HttpResponse::Ok().json(HealthBody { status: "live" })
}

/// Readiness probe.
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    if state.ready {
        HttpResponse::Ok().json(HealthBody { status: "ready" })
    } else {
        HttpResponse::ServiceUnavailable().json(HealthBody {
            status: "not ready",
        })
    }
}
