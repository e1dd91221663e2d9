//! HTTP inbound adapter exposing the auth, RPC, and health endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod rpc;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
