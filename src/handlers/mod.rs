//! HTTP handlers and the response envelope.

pub mod http;
pub mod response;

pub use http::{health, list_users, AppState};
