//! Auth middleware: bearer token extractor for protected routes.

use axum::http::request::Parts;

use crate::auth::Claims;
use crate::error::AppError;
use crate::handlers::http::AppState;

/// Extractor: claims of a verified bearer token.
///
/// Rejects with `MissingToken` (401) when there is no token and `InvalidToken`
/// (400) when it does not verify.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Claims);

#[axum::async_trait]
impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims = state.jwt_secret().verify_token(&parts.headers)?;
        Ok(AuthUser(claims))
    }
}
