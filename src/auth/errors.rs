use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingAuthHeader,
    #[error("Invalid authorization header format")]
    InvalidAuthHeaderFormat,
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
    #[error("Insufficient permissions")]
    InsufficientPermissions,
    #[error("Token identity does not match the requested identity")]
    IdentityMismatch,
    #[error("User directory unavailable: {0}")]
    DirectoryUnavailable(String),
    #[error("Token creation failed: {0}")]
    TokenCreation(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeaderFormat
            | AuthError::InvalidToken
            | AuthError::TokenExpired => StatusCode::UNAUTHORIZED,
            AuthError::InsufficientPermissions | AuthError::IdentityMismatch => {
                StatusCode::FORBIDDEN
            }
            AuthError::DirectoryUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::TokenCreation(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn short_message(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeaderFormat
            | AuthError::InvalidToken
            | AuthError::TokenExpired => "unauthorized access",
            AuthError::InsufficientPermissions | AuthError::IdentityMismatch => "forbidden access",
            AuthError::DirectoryUnavailable(_) => "service unavailable",
            AuthError::TokenCreation(_) => "internal server error",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Internal details stay in the logs.
        let message = match &self {
            AuthError::DirectoryUnavailable(_) => "User directory unavailable".to_string(),
            AuthError::TokenCreation(_) => "Token creation failed".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": self.short_message(),
            "message": message,
        }));

        (self.status_code(), body).into_response()
    }
}
