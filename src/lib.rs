//! Bearer token verification and password-based registration/login over a
//! single JSON user file.
//!
//! The library surface is [`JwtSecret::verify_token`] and [`UserStore`]
//! (`register`, `login`, `list_users`, `persist_users`); [`create_app`] wires
//! both into a small axum router.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod store;

pub use auth::JwtSecret;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use handlers::AppState;
pub use models::{PublicUser, User};
pub use store::UserStore;

use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

/// Build the API router (health, auth, users). Used by main and by integration tests.
pub fn create_app(state: AppState) -> axum::Router {
    let auth_routes = axum::Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(auth::me));

    axum::Router::new()
        .route("/health", get(handlers::health))
        .route("/users", get(handlers::list_users))
        .nest("/auth", auth_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
