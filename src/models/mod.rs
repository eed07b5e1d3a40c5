//! Data models for users.

pub mod user;

pub use user::*;
