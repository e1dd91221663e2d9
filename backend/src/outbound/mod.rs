//! Outbound adapters: persistence and downstream HTTP.

pub mod api_client;
pub mod persistence;

pub use api_client::{ApiClient, OutboundRequest, OutboundResponse, ReqwestTransport, TokenProvider, Transport};
