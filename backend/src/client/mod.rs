//! Client-side building blocks embedded by the frontend shell.

pub mod store;

pub use store::{AppStore, RootState, SubscriptionId, resolve_guard};
