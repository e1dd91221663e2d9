//! Diesel/PostgreSQL persistence adapters.

pub mod diesel_login_service;
pub mod diesel_token_store;
pub mod diesel_user_repository;
mod error_mapping;
pub mod models;
pub mod pool;
pub mod schema;

pub use diesel_login_service::DieselLoginService;
pub use diesel_token_store::DieselTokenStore;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
