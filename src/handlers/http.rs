//! HTTP handlers: shared state, health, user listing.

use axum::{extract::State, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

use crate::auth::JwtSecret;
use crate::error::AppError;
use crate::handlers::response::{success, EnvelopeResponse};
use crate::middleware::AuthUser;
use crate::models::PublicUser;
use crate::store::UserStore;

/// Shared application state for the HTTP routes.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<UserStore>,
    pub jwt_secret: JwtSecret,
}

impl AppState {
    pub fn new(store: UserStore, jwt_secret: JwtSecret) -> Self {
        Self {
            store: Arc::new(store),
            jwt_secret,
        }
    }

    pub fn store(&self) -> &UserStore {
        &self.store
    }

    pub fn jwt_secret(&self) -> &JwtSecret {
        &self.jwt_secret
    }
}

/// GET /users — every user, hashes stripped. Requires a bearer token.
pub async fn list_users(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<EnvelopeResponse<Vec<PublicUser>>, AppError> {
    let users = state.store().list_users().await?;
    let users: Vec<PublicUser> = users.iter().map(PublicUser::from).collect();
    Ok(success(StatusCode::OK, "Users found.", Some(users)))
}

/// GET /health — liveness probe.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "service": "authstore" })),
    )
}
