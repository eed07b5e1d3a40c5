//! JWT issue and validation, plus bearer token extraction from request headers.

use crate::error::{AppError, AppResult};
use crate::models::User;
use axum::http::{header::AUTHORIZATION, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

/// Claims embedded in tokens this crate issues. Verification itself is
/// generic, so tokens carrying other payloads decode into their own types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct JwtSecret {
    secret: String,
    ttl_minutes: i64,
}

impl JwtSecret {
    pub fn new(secret: String, ttl_minutes: i64) -> Self {
        Self {
            secret,
            ttl_minutes,
        }
    }

    pub fn issue<C: Serialize>(&self, claims: &C) -> AppResult<String> {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("jwt encode: {}", e)))
    }

    /// Issue a token for `user` that expires after the configured TTL.
    pub fn issue_for(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let exp = Duration::try_minutes(self.ttl_minutes)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                AppError::Config(format!(
                    "token ttl of {} minutes is out of range",
                    self.ttl_minutes
                ))
            })?;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        let token = self.issue(&claims)?;
        debug!(user_id = %user.id, "jwt issued");
        Ok(token)
    }

    /// Check signature, format and expiry, returning the embedded claims.
    ///
    /// `exp` is optional; when present it is enforced with no clock leeway.
    pub fn verify<C: DeserializeOwned>(&self, token: &str) -> AppResult<C> {
        let mut validation = Validation::default();
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_aud = false;
        validation.leeway = 0;
        let data = decode::<C>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            debug!(error = %e, "jwt rejected");
            AppError::InvalidToken(e.to_string())
        })?;
        Ok(data.claims)
    }

    /// Extract the bearer token from `headers` and verify it.
    pub fn verify_token<C: DeserializeOwned>(&self, headers: &HeaderMap) -> AppResult<C> {
        let token = bearer_token(headers)?;
        self.verify(token)
    }
}

/// The token part of an `Authorization: <scheme> <token>` header.
///
/// A missing header, or one with nothing after the scheme, is `MissingToken`;
/// a header that is not visible ASCII is `InvalidToken`.
pub fn bearer_token(headers: &HeaderMap) -> AppResult<&str> {
    let value = headers.get(AUTHORIZATION).ok_or(AppError::MissingToken)?;
    let value = value
        .to_str()
        .map_err(|_| AppError::InvalidToken("malformed Authorization header".to_string()))?;
    let token = value
        .trim()
        .split_once(' ')
        .map(|(_, rest)| rest.trim())
        .unwrap_or("");
    if token.is_empty() {
        return Err(AppError::MissingToken);
    }
    Ok(token)
}
