//! Error taxonomy shared by the auth core and goal handlers.
//!
//! Store failures on the revocation-check and rate-limit paths never surface
//! here; those callers degrade open instead. Everything else maps to a fixed
//! status code with a JSON `detail` body, and internal causes are logged but
//! never leaked to the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("User not found or inactive")]
    PrincipalNotFound,

    #[error("Too many requests. Please try again later.")]
    TooManyRequests,

    #[error("Email already registered")]
    DuplicateEmail,

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidCredentials
            | Self::NotAuthenticated
            | Self::InvalidToken
            | Self::TokenRevoked
            | Self::PrincipalNotFound => StatusCode::UNAUTHORIZED,
            Self::AccountDisabled => StatusCode::FORBIDDEN,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::DuplicateEmail | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(err) = &self {
            error!("Internal error: {err:#}");
        }
        let body = ErrorBody {
            detail: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_documented_status_codes() {
        assert_eq!(
            ApiError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::AccountDisabled.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotAuthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ApiError::InvalidToken.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::TokenRevoked.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            ApiError::PrincipalNotFound.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::TooManyRequests.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ApiError::DuplicateEmail.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Validation("bad".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::NotFound("Goal not found").status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn internal_error_body_is_generic() {
        let err = ApiError::Internal(anyhow::anyhow!("connection pool exhausted"));
        assert_eq!(err.to_string(), "Internal server error");
    }
}
