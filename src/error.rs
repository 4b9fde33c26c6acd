use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Request-scoped failure, rendered as a JSON `{"message": ...}` body.
///
/// Credential failures are deliberately undifferentiated: an unknown email
/// and a wrong password produce the same message and status.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("Email in use")]
    EmailInUse,
    #[error("Email or password is wrong")]
    WrongCredentials,
    #[error("Please verify your email")]
    EmailNotVerified,
    #[error("Not authorized")]
    Unauthorized,
    #[error("Verification has already been passed")]
    AlreadyVerified,
    #[error("Not found")]
    NotFound,
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::AlreadyVerified => StatusCode::BAD_REQUEST,
            ApiError::WrongCredentials | ApiError::EmailNotVerified | ApiError::Unauthorized => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::EmailInUse => StatusCode::CONFLICT,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Internal(ref e) = self {
            // Log the cause; the body stays opaque.
            error!(error = %e, "request failed");
        }
        let status = self.status();
        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_error_kinds() {
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::EmailInUse.status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::WrongCredentials.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::EmailNotVerified.status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::AlreadyVerified.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::Internal(anyhow::anyhow!("boom")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn credential_failures_share_one_message() {
        // Unknown email and wrong password must be indistinguishable.
        assert_eq!(
            ApiError::WrongCredentials.to_string(),
            "Email or password is wrong"
        );
    }

    #[test]
    fn internal_errors_hide_the_cause() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused (db at 10.0.0.3)"));
        assert_eq!(err.to_string(), "Internal server error");
    }
}
