use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;
use crate::store::{Document, StoreError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Auth(err) => return err.into_response(),
            ApiError::Store(StoreError::DuplicateId(_) | StoreError::UniqueViolation(_)) => {
                (StatusCode::CONFLICT, "Duplicate document")
            }
            ApiError::Store(StoreError::InvalidDocument(_)) => {
                (StatusCode::BAD_REQUEST, "Invalid document")
            }
            ApiError::Store(ref err) => {
                error!(error = %err, "document store operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "Not found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "Bad request"),
        };

        let message = match &self {
            ApiError::Store(StoreError::Database(_)) => error_message.to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Request bodies must be JSON objects
pub fn object_body(body: Value) -> Result<Document, ApiError> {
    match body {
        Value::Object(document) => Ok(document),
        _ => Err(ApiError::BadRequest("expected a JSON object".to_string())),
    }
}

/// The `email` field of a request body
pub fn email_field(document: &Document) -> Result<String, ApiError> {
    document
        .get("email")
        .and_then(|email| email.as_str())
        .filter(|email| !email.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest("email is required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let forbidden = ApiError::from(AuthError::IdentityMismatch).into_response();
        assert_eq!(forbidden.status(), StatusCode::FORBIDDEN);

        let conflict = ApiError::from(StoreError::DuplicateId("x".into())).into_response();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let taken = ApiError::from(StoreError::UniqueViolation("email")).into_response();
        assert_eq!(taken.status(), StatusCode::CONFLICT);

        let missing = ApiError::NotFound("Trainer").into_response();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_email_field() {
        let document = object_body(json!({ "email": "a@x.com" })).unwrap();
        assert_eq!(email_field(&document).unwrap(), "a@x.com");

        let blank = object_body(json!({ "email": "" })).unwrap();
        assert!(email_field(&blank).is_err());

        assert!(object_body(json!(["a@x.com"])).is_err());
    }
}
