//! HTTP adapter mapping for domain errors.
//!
//! Keeps the domain error type HTTP-agnostic while letting Actix handlers
//! turn failures into the JSON envelope with the bound status code.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorKind};

/// Convenient result alias for HTTP handlers.
pub use crate::domain::error::ApiResult;

fn redact_if_internal(error: &Error) -> Error {
    if error.kind() == ErrorKind::InternalServerError {
        // The original message may carry adapter details; clients get the
        // default text, logs keep the full story.
        Error::internal_server_error()
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        if self.kind() == ErrorKind::InternalServerError {
            error!(message = %self.message(), "internal error returned to client");
        }
        HttpResponse::build(self.status_code()).json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal_server_error()
    }
}
