use axum::{extract::State, response::Json};

use crate::api::{ApiError, AppState};
use crate::auth::{IssueTokenRequest, TokenResponse};

/// Issue a one-hour bearer token for the posted identity
#[tracing::instrument(skip(state, request), fields(email = %request.email))]
pub async fn issue_token(
    State(state): State<AppState>,
    Json(request): Json<IssueTokenRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let response = state.auth_service.issue_token(request)?;
    Ok(Json(response))
}
