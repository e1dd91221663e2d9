//! Typed RPC layer: per-request context, middleware chain, procedure
//! registry, and the wire codec.

pub mod codec;
pub mod context;
pub mod middleware;
pub mod procedures;
pub mod router;

pub use codec::{Meta, TypeTag, WireEnvelope};
pub use context::{ContextBuilder, RpcContext};
pub use procedures::starter_router;
pub use router::{Procedure, Router};
