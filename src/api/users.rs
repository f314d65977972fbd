use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::api::errors::{email_field, object_body};
use crate::api::{ApiError, AppState};
use crate::auth::{AuthContext, UserRole};
use crate::models::{AdminCheckResponse, MessageResponse, RoleResponse, UpdateRoleRequest};
use crate::store::{Collection, Document, Filter, Page, StoreError};

/// List all users (admin only)
#[tracing::instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<Document>>, ApiError> {
    let users = state
        .store
        .find(Collection::Users, &Filter::all(), Page::default())
        .await?;
    Ok(Json(users))
}

/// Register the caller's own user record. Existing emails are reported, not duplicated.
#[tracing::instrument(skip(state, body))]
pub async fn create_user(
    State(state): State<AppState>,
    context: AuthContext,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let mut user = object_body(body)?;
    let email = email_field(&user)?;
    context.ensure_identity(&email)?;

    // Roles are granted by administrators only.
    user.remove("role");

    let existing = state
        .store
        .find_one(Collection::Users, &Filter::eq("email", email.as_str()))
        .await?;
    if existing.is_some() {
        return Ok(Json(json!(MessageResponse::new("user already exists"))));
    }

    // A concurrent registration can still win between the lookup and the insert
    let result = match state.store.insert_one(Collection::Users, user).await {
        Ok(result) => result,
        Err(StoreError::UniqueViolation(_)) => {
            return Ok(Json(json!(MessageResponse::new("user already exists"))))
        }
        Err(err) => return Err(err.into()),
    };
    tracing::info!(email = %email, "registered user");
    Ok(Json(json!(result)))
}

/// Delete a user by id (admin only)
#[tracing::instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let result = state
        .store
        .delete_one(Collection::Users, &Filter::by_id(&id))
        .await?;
    if result.deleted_count == 0 {
        return Err(ApiError::NotFound("User"));
    }
    Ok(Json(json!(result)))
}

/// Set a user's role (admin only)
#[tracing::instrument(skip(state))]
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateRoleRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut patch = Document::new();
    patch.insert("role".to_string(), json!(request.role.as_str()));

    let result = state
        .store
        .update_one(Collection::Users, &Filter::by_id(&id), patch)
        .await?;
    if result.matched_count == 0 {
        return Err(ApiError::NotFound("User"));
    }

    tracing::info!(user_id = %id, role = request.role.as_str(), "updated user role");
    Ok(Json(json!(result)))
}

/// Whether the caller is currently an admin
#[tracing::instrument(skip(state))]
pub async fn check_admin(
    State(state): State<AppState>,
    context: AuthContext,
    Path(email): Path<String>,
) -> Result<Json<AdminCheckResponse>, ApiError> {
    context.ensure_identity(&email)?;

    let role = state.auth_service.current_role(&email).await?;
    Ok(Json(AdminCheckResponse {
        admin: role == UserRole::Admin,
    }))
}

/// The caller's current role
#[tracing::instrument(skip(state))]
pub async fn get_role(
    State(state): State<AppState>,
    context: AuthContext,
    Path(email): Path<String>,
) -> Result<Json<RoleResponse>, ApiError> {
    context.ensure_identity(&email)?;

    let role = state.auth_service.current_role(&email).await?;
    Ok(Json(RoleResponse { email, role }))
}
