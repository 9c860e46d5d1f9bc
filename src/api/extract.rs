//! Bearer-token authentication extractor

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use super::response::ApiError;
use super::server::AppState;
use crate::error::Error;
use crate::models::User;

/// The authenticated user behind the request's bearer token.
///
/// Handlers taking `AuthUser` reject unauthenticated requests with 401
/// before any business logic runs.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::auth("No token, authorization denied"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| Error::auth("No token, authorization denied"))?;

        let user = state.auth.verify_token(token).await?;
        Ok(AuthUser(user))
    }
}
