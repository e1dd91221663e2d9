//! Shared fixtures for inbound HTTP tests.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

/// Cookie name the production wiring registers; tests must match it so the
/// session extractor finds the record on replayed requests.
const SESSION_COOKIE: &str = "session";

/// Cookie session middleware for in-process service tests.
///
/// Signs with a throwaway key and leaves the cookie insecure so plain-HTTP
/// test requests can carry it between calls.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    let key = Key::generate();
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}
