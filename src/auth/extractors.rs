use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;
use uuid::Uuid;

use crate::auth::jwt::JwtKeys;
use crate::auth::repo::User;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated identity, taken from the verified token claims rather than
/// re-read from the user row.
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        // Exact "Bearer <token>" shape; any other scheme is rejected.
        let token = header.strip_prefix("Bearer ").ok_or(ApiError::Unauthorized)?;

        let claims = JwtKeys::from_ref(state).verify(token).map_err(|_| {
            warn!("invalid or expired token");
            ApiError::Unauthorized
        })?;

        // The presented token must be the one currently stored on the user:
        // logout and re-login invalidate older tokens before they expire.
        let user = User::find_by_id(&state.db, claims.sub).await?;
        match user {
            Some(User {
                session_token: Some(stored),
                ..
            }) if stored == token => Ok(AuthUser {
                id: claims.sub,
                email: claims.email,
            }),
            _ => {
                warn!(user_id = %claims.sub, "token not bound to an active session");
                Err(ApiError::Unauthorized)
            }
        }
    }
}
