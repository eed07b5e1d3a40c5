//! Auth HTTP handlers: register, login, me.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::handlers::http::AppState;
use crate::handlers::response::{success, EnvelopeResponse};
use crate::middleware::AuthUser;
use crate::models::PublicUser;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub user: PublicUser,
    pub token: String,
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<EnvelopeResponse<SessionData>, AppError> {
    let Json(body) = body?;
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state.store().register(&body.email, &body.password).await?;
    let token = state.jwt_secret().issue_for(&user)?;

    Ok(success(
        StatusCode::CREATED,
        "User registered.",
        Some(SessionData {
            user: user.public(),
            token,
        }),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<EnvelopeResponse<SessionData>, AppError> {
    let Json(body) = body?;
    if !state.store().login(&body.email, &body.password).await? {
        return Err(AppError::InvalidCredentials);
    }

    let user = state
        .store()
        .find_by_email(&body.email)
        .await
        .ok_or_else(|| AppError::UserNotFound(body.email.clone()))?;
    let token = state.jwt_secret().issue_for(&user)?;

    Ok(success(
        StatusCode::OK,
        "Login successful.",
        Some(SessionData {
            user: user.public(),
            token,
        }),
    ))
}

/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
) -> Result<EnvelopeResponse<PublicUser>, AppError> {
    let id = Uuid::parse_str(&claims.sub)
        .map_err(|e| AppError::InvalidToken(format!("subject: {}", e)))?;
    let user = state
        .store()
        .find_by_id(id)
        .await
        .ok_or_else(|| AppError::UserNotFound(claims.sub.clone()))?;

    Ok(success(StatusCode::OK, "User found.", Some(user.public())))
}
