//! Application error taxonomy.
//!
//! Errors are transport agnostic: each [`ErrorKind`] binds a default message
//! and the HTTP status the inbound adapter will eventually use. Values are
//! immutable after construction; builders return fresh copies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fixed hierarchy of failure categories.
///
/// Every variant carries a documented default message and status code so a
/// bare construction such as `Error::not_found()` is already a complete,
/// serialisable response. 498 and 499 are the two custom token codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    NotAcceptable,
    RequestTimeout,
    PreconditionFailed,
    PayloadTooLarge,
    UriTooLong,
    ImATeapot,
    Locked,
    FailedDependency,
    PreconditionRequired,
    TooManyRequests,
    TokenInvalid,
    TokenRequired,
    InternalServerError,
    NotImplemented,
    BadGateway,
    ServiceUnavailable,
    GatewayTimeout,
    NotExtended,
    NetworkAuthenticationRequired,
}

impl ErrorKind {
    /// Every variant, in status-code order. Used by exhaustive tests and by
    /// [`ErrorKind::from_status`].
    pub const ALL: [Self; 23] = [
        Self::BadRequest,
        Self::Unauthorized,
        Self::Forbidden,
        Self::NotFound,
        Self::NotAcceptable,
        Self::RequestTimeout,
        Self::PreconditionFailed,
        Self::PayloadTooLarge,
        Self::UriTooLong,
        Self::ImATeapot,
        Self::Locked,
        Self::FailedDependency,
        Self::PreconditionRequired,
        Self::TooManyRequests,
        Self::TokenInvalid,
        Self::TokenRequired,
        Self::InternalServerError,
        Self::NotImplemented,
        Self::BadGateway,
        Self::ServiceUnavailable,
        Self::GatewayTimeout,
        Self::NotExtended,
        Self::NetworkAuthenticationRequired,
    ];

    /// HTTP status code bound to this kind.
    pub const fn status(self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::NotAcceptable => 406,
            Self::RequestTimeout => 408,
            Self::PreconditionFailed => 412,
            Self::PayloadTooLarge => 413,
            Self::UriTooLong => 414,
            Self::ImATeapot => 418,
            Self::Locked => 423,
            Self::FailedDependency => 424,
            Self::PreconditionRequired => 428,
            Self::TooManyRequests => 429,
            Self::TokenInvalid => 498,
            Self::TokenRequired => 499,
            Self::InternalServerError => 500,
            Self::NotImplemented => 501,
            Self::BadGateway => 502,
            Self::ServiceUnavailable => 503,
            Self::GatewayTimeout => 504,
            Self::NotExtended => 510,
            Self::NetworkAuthenticationRequired => 511,
        }
    }

    /// Default human-readable message bound to this kind.
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::BadRequest => "Bad Request",
            Self::Unauthorized => "Unauthorized",
            Self::Forbidden => "Forbidden",
            Self::NotFound => "Not Found",
            Self::NotAcceptable => "Not Acceptable",
            Self::RequestTimeout => "Request Timeout",
            Self::PreconditionFailed => "Precondition Failed",
            Self::PayloadTooLarge => "Payload Too Large",
            Self::UriTooLong => "URI Too Long",
            Self::ImATeapot => "I'm a Teapot",
            Self::Locked => "Locked",
            Self::FailedDependency => "Failed Dependency",
            Self::PreconditionRequired => "Precondition Required",
            Self::TooManyRequests => "Too Many Requests",
            Self::TokenInvalid => "Token Invalid",
            Self::TokenRequired => "Token Required",
            Self::InternalServerError => "Internal Server Error",
            Self::NotImplemented => "Not Implemented",
            Self::BadGateway => "Bad Gateway",
            Self::ServiceUnavailable => "Service Unavailable",
            Self::GatewayTimeout => "Gateway Timeout",
            Self::NotExtended => "Not Extended",
            Self::NetworkAuthenticationRequired => "Network Authentication Required",
        }
    }

    /// Resolve a kind from a wire status code.
    ///
    /// Unknown codes collapse to [`ErrorKind::InternalServerError`], matching
    /// the envelope's "code defaults to 500" contract.
    pub fn from_status(status: u16) -> Self {
        Self::ALL
            .into_iter()
            .find(|kind| kind.status() == status)
            .unwrap_or(Self::InternalServerError)
    }
}

/// Structured supplement attached to an [`Error`].
///
/// All fields are optional; the envelope omits `extra` entirely when none
/// were supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extra {
    /// Component or subsystem the error originated from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Application-specific sub-code, distinct from the HTTP status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Longer description intended for operators, not end users.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Route the client should navigate to after handling the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_to: Option<String>,
    /// Free-form structured payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional: Option<Value>,
}

impl Extra {
    /// Supplement naming only the originating component.
    pub fn from_component(from: impl Into<String>) -> Self {
        Self {
            from: Some(from.into()),
            ..Self::default()
        }
    }

    /// Supplement carrying only an operator-facing description.
    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    /// Supplement carrying only a free-form payload.
    pub fn additional(value: Value) -> Self {
        Self {
            additional: Some(value),
            ..Self::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.from.is_none()
            && self.code.is_none()
            && self.description.is_none()
            && self.redirect_to.is_none()
            && self.additional.is_none()
    }
}

/// Application error payload.
///
/// ## Invariants
/// - Immutable after construction; the `with_*` builders consume and return.
/// - Serialises to the envelope `{error, code, extra?}` where `error` is the
///   message and `code` the bound HTTP status.
///
/// # Examples
/// ```
/// use backend::domain::{Error, ErrorKind};
///
/// let err = Error::not_found();
/// assert_eq!(err.kind(), ErrorKind::NotFound);
/// assert_eq!(err.message(), "Not Found");
/// assert_eq!(err.status(), 404);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Envelope", into = "Envelope")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    extra: Option<Extra>,
}

impl Error {
    /// Construct an error of the given kind with its default message.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.default_message().to_owned(),
            extra: None,
        }
    }

    /// Wrap a foreign error into the internal-server-error variant.
    ///
    /// The source text is preserved in `extra.description` for operators;
    /// inbound adapters redact it before it reaches clients.
    pub fn wrap(source: impl std::fmt::Display) -> Self {
        Self::internal_server_error().with_extra(Extra::description(source.to_string()))
    }

    /// Replace the default message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach a structured supplement.
    pub fn with_extra(mut self, extra: Extra) -> Self {
        self.extra = Some(extra);
        self
    }

    /// Failure category.
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Human-readable message serialised as the envelope's `error` field.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// HTTP status bound to the kind.
    pub const fn status(&self) -> u16 {
        self.kind.status()
    }

    /// Structured supplement, if one was attached.
    pub const fn extra(&self) -> Option<&Extra> {
        self.extra.as_ref()
    }
}

macro_rules! kind_constructors {
    ($($(#[$meta:meta])* $name:ident => $kind:ident),* $(,)?) => {
        impl Error {
            $(
                $(#[$meta])*
                pub fn $name() -> Self {
                    Self::new(ErrorKind::$kind)
                }
            )*
        }
    };
}

kind_constructors! {
    /// 400 with the default "Bad Request" message.
    bad_request => BadRequest,
    /// 401 with the default "Unauthorized" message.
    unauthorized => Unauthorized,
    /// 403 with the default "Forbidden" message.
    forbidden => Forbidden,
    /// 404 with the default "Not Found" message.
    not_found => NotFound,
    /// 406 with the default "Not Acceptable" message.
    not_acceptable => NotAcceptable,
    /// 408 with the default "Request Timeout" message.
    request_timeout => RequestTimeout,
    /// 412 with the default "Precondition Failed" message.
    precondition_failed => PreconditionFailed,
    /// 413 with the default "Payload Too Large" message.
    payload_too_large => PayloadTooLarge,
    /// 414 with the default "URI Too Long" message.
    uri_too_long => UriTooLong,
    /// 418 with the default "I'm a Teapot" message.
    im_a_teapot => ImATeapot,
    /// 423 with the default "Locked" message.
    locked => Locked,
    /// 424 with the default "Failed Dependency" message.
    failed_dependency => FailedDependency,
    /// 428 with the default "Precondition Required" message.
    precondition_required => PreconditionRequired,
    /// 429 with the default "Too Many Requests" message.
    too_many_requests => TooManyRequests,
    /// 498 (custom) with the default "Token Invalid" message.
    token_invalid => TokenInvalid,
    /// 499 (custom) with the default "Token Required" message.
    token_required => TokenRequired,
    /// 500 with the default "Internal Server Error" message.
    internal_server_error => InternalServerError,
    /// 501 with the default "Not Implemented" message.
    not_implemented => NotImplemented,
    /// 502 with the default "Bad Gateway" message.
    bad_gateway => BadGateway,
    /// 503 with the default "Service Unavailable" message.
    service_unavailable => ServiceUnavailable,
    /// 504 with the default "Gateway Timeout" message.
    gateway_timeout => GatewayTimeout,
    /// 510 with the default "Not Extended" message.
    not_extended => NotExtended,
    /// 511 with the default "Network Authentication Required" message.
    network_authentication_required => NetworkAuthenticationRequired,
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

/// Wire shape of the error response: `{error, code, extra?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    error: String,
    code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    extra: Option<Extra>,
}

impl From<Error> for Envelope {
    fn from(value: Error) -> Self {
        let Error {
            kind,
            message,
            extra,
        } = value;
        Self {
            error: message,
            code: kind.status(),
            extra: extra.filter(|extra| !extra.is_empty()),
        }
    }
}

impl TryFrom<Envelope> for Error {
    type Error = std::convert::Infallible;

    fn try_from(value: Envelope) -> Result<Self, Self::Error> {
        let Envelope { error, code, extra } = value;
        Ok(Self {
            kind: ErrorKind::from_status(code),
            message: error,
            extra,
        })
    }
}

/// Convenient result alias used across the crate.
pub type ApiResult<T> = Result<T, Error>;

#[cfg(test)]
mod tests {
    //! Regression coverage for the taxonomy and its envelope.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn every_kind_binds_documented_defaults() {
        let expected: [(ErrorKind, u16, &str); 23] = [
            (ErrorKind::BadRequest, 400, "Bad Request"),
            (ErrorKind::Unauthorized, 401, "Unauthorized"),
            (ErrorKind::Forbidden, 403, "Forbidden"),
            (ErrorKind::NotFound, 404, "Not Found"),
            (ErrorKind::NotAcceptable, 406, "Not Acceptable"),
            (ErrorKind::RequestTimeout, 408, "Request Timeout"),
            (ErrorKind::PreconditionFailed, 412, "Precondition Failed"),
            (ErrorKind::PayloadTooLarge, 413, "Payload Too Large"),
            (ErrorKind::UriTooLong, 414, "URI Too Long"),
            (ErrorKind::ImATeapot, 418, "I'm a Teapot"),
            (ErrorKind::Locked, 423, "Locked"),
            (ErrorKind::FailedDependency, 424, "Failed Dependency"),
            (ErrorKind::PreconditionRequired, 428, "Precondition Required"),
            (ErrorKind::TooManyRequests, 429, "Too Many Requests"),
            (ErrorKind::TokenInvalid, 498, "Token Invalid"),
            (ErrorKind::TokenRequired, 499, "Token Required"),
            (ErrorKind::InternalServerError, 500, "Internal Server Error"),
            (ErrorKind::NotImplemented, 501, "Not Implemented"),
            (ErrorKind::BadGateway, 502, "Bad Gateway"),
            (ErrorKind::ServiceUnavailable, 503, "Service Unavailable"),
            (ErrorKind::GatewayTimeout, 504, "Gateway Timeout"),
            (ErrorKind::NotExtended, 510, "Not Extended"),
            (
                ErrorKind::NetworkAuthenticationRequired,
                511,
                "Network Authentication Required",
            ),
        ];

        assert_eq!(expected.len(), ErrorKind::ALL.len());
        for (kind, status, message) in expected {
            let err = Error::new(kind);
            assert_eq!(err.status(), status, "status for {kind:?}");
            assert_eq!(err.message(), message, "message for {kind:?}");
            assert!(err.extra().is_none(), "no extra by default for {kind:?}");
        }
    }

    #[test]
    fn envelope_always_includes_error_and_code() {
        let value = serde_json::to_value(Error::forbidden()).expect("serialise error");
        assert_eq!(value, json!({ "error": "Forbidden", "code": 403 }));
    }

    #[test]
    fn envelope_includes_extra_iff_supplied() {
        let bare = serde_json::to_value(Error::locked()).expect("serialise error");
        assert!(bare.get("extra").is_none());

        let with_extra = Error::locked().with_extra(Extra {
            from: Some("billing".into()),
            additional: Some(json!({ "invoice": 42 })),
            ..Extra::default()
        });
        let value = serde_json::to_value(with_extra).expect("serialise error");
        assert_eq!(
            value,
            json!({
                "error": "Locked",
                "code": 423,
                "extra": { "from": "billing", "additional": { "invoice": 42 } },
            })
        );
    }

    #[test]
    fn with_message_overrides_default() {
        let err = Error::bad_request().with_message("username must not be empty");
        assert_eq!(err.message(), "username must not be empty");
        assert_eq!(err.status(), 400);
    }

    #[rstest]
    #[case(404, ErrorKind::NotFound)]
    #[case(498, ErrorKind::TokenInvalid)]
    #[case(499, ErrorKind::TokenRequired)]
    #[case(599, ErrorKind::InternalServerError)]
    #[case(200, ErrorKind::InternalServerError)]
    fn from_status_defaults_unknown_codes_to_500(#[case] status: u16, #[case] expected: ErrorKind) {
        assert_eq!(ErrorKind::from_status(status), expected);
    }

    #[test]
    fn deserialising_an_envelope_round_trips() {
        let raw = json!({
            "error": "Token Invalid",
            "code": 498,
            "extra": { "redirectTo": "/auth/login" },
        });
        let err: Error = serde_json::from_value(raw).expect("envelope should parse");
        assert_eq!(err.kind(), ErrorKind::TokenInvalid);
        assert_eq!(
            err.extra().and_then(|extra| extra.redirect_to.as_deref()),
            Some("/auth/login")
        );
    }

    #[test]
    fn wrap_produces_internal_error_with_description() {
        let io = std::io::Error::other("disk on fire");
        let err = Error::wrap(io);
        assert_eq!(err.kind(), ErrorKind::InternalServerError);
        assert_eq!(err.message(), "Internal Server Error");
        assert_eq!(
            err.extra().and_then(|extra| extra.description.as_deref()),
            Some("disk on fire")
        );
    }
}
