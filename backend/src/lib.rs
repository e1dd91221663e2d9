//! Backend library modules.

pub mod client;
pub mod constants;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod rpc;

/// Request-scoped trace identifier middleware.
pub use middleware::Trace;
