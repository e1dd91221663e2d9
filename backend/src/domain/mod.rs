//! Core domain model: users, roles, sessions, errors, and the auth guard.

pub mod auth;
pub mod error;
pub mod guard;
pub mod ports;
pub mod role;
pub mod session;
pub mod user;

pub use auth::{LoginCredentials, LoginValidationError};
pub use error::{ApiResult, Error, ErrorKind, Extra};
pub use guard::{GuardOutcome, LevelRolePolicy, PagePolicy, PermissiveRolePolicy, RolePolicy};
pub use role::{Role, UnknownRole};
pub use session::{SessionRecord, SessionStatus, SessionUser};
pub use user::{Email, User, UserId, UserValidationError};
