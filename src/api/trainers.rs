use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::api::errors::{email_field, object_body};
use crate::api::{ApiError, AppState};
use crate::auth::{AuthContext, UserRole};
use crate::models::{ApprovalResponse, MessageResponse};
use crate::store::{Collection, Document, Filter, Page, ID_FIELD};

#[tracing::instrument(skip(state))]
pub async fn list_trainers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let trainers = state
        .store
        .find(Collection::Trainers, &Filter::all(), Page::default())
        .await?;
    Ok(Json(trainers))
}

#[tracing::instrument(skip(state))]
pub async fn get_trainer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    state
        .store
        .find_one(Collection::Trainers, &Filter::by_id(&id))
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("Trainer"))
}

/// Add a trainer profile (admin only)
#[tracing::instrument(skip(state, body))]
pub async fn add_trainer(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let trainer = object_body(body)?;
    let result = state.store.insert_one(Collection::Trainers, trainer).await?;
    Ok(Json(json!(result)))
}

/// Remove a trainer profile (admin only)
#[tracing::instrument(skip(state))]
pub async fn remove_trainer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let result = state
        .store
        .delete_one(Collection::Trainers, &Filter::by_id(&id))
        .await?;
    if result.deleted_count == 0 {
        return Err(ApiError::NotFound("Trainer"));
    }
    Ok(Json(json!(result)))
}

/// Pending applications to become a trainer (admin only)
#[tracing::instrument(skip(state))]
pub async fn list_requests(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let requests = state
        .store
        .find(Collection::TrainerRequests, &Filter::all(), Page::default())
        .await?;
    Ok(Json(requests))
}

/// Apply to become a trainer; one pending application per email
#[tracing::instrument(skip(state, body))]
pub async fn apply(
    State(state): State<AppState>,
    context: AuthContext,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let application = object_body(body)?;
    let email = email_field(&application)?;
    context.ensure_identity(&email)?;

    let pending = state
        .store
        .count(Collection::TrainerRequests, &Filter::eq("email", email.as_str()))
        .await?;
    if pending > 0 {
        return Ok(Json(json!(MessageResponse::new("request already exists"))));
    }

    let result = state
        .store
        .insert_one(Collection::TrainerRequests, application)
        .await?;
    Ok(Json(json!(result)))
}

/// Approve an application: the applicant gets a trainer profile and the
/// trainer role, and the application is removed (admin only).
///
/// Steps run profile, then role, then request removal, and each is safe to
/// repeat, so an approval interrupted part-way can simply be retried.
#[tracing::instrument(skip(state))]
pub async fn approve_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApprovalResponse>, ApiError> {
    let mut application = state
        .store
        .find_one(Collection::TrainerRequests, &Filter::by_id(&id))
        .await?
        .ok_or(ApiError::NotFound("Trainer request"))?;
    let email = email_field(&application)?;
    let by_email = Filter::eq("email", email.as_str());

    if state.store.find_one(Collection::Users, &by_email).await?.is_none() {
        return Err(ApiError::NotFound("User"));
    }

    if state.store.count(Collection::Trainers, &by_email).await? == 0 {
        application.remove(ID_FIELD);
        state
            .store
            .insert_one(Collection::Trainers, application)
            .await?;
    }

    let mut patch = Document::new();
    patch.insert("role".to_string(), json!(UserRole::Trainer.as_str()));
    let promoted = state
        .store
        .update_one(Collection::Users, &by_email, patch)
        .await?;
    if promoted.matched_count == 0 {
        return Err(ApiError::NotFound("User"));
    }

    state
        .store
        .delete_one(Collection::TrainerRequests, &Filter::by_id(&id))
        .await?;

    tracing::info!(email = %email, "approved trainer request");
    Ok(Json(ApprovalResponse {
        approved: true,
        email,
    }))
}
