use axum::{
    extract::{Query, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::api::errors::{email_field, object_body};
use crate::api::{ApiError, AppState};
use crate::auth::AuthContext;
use crate::models::{MessageResponse, PagedResponse};
use crate::store::{Collection, Document, Filter, Page};

async fn paged(
    state: &AppState,
    collection: Collection,
    page: Page,
) -> Result<Json<PagedResponse>, ApiError> {
    let items = state.store.find(collection, &Filter::all(), page).await?;
    let total = state.store.count(collection, &Filter::all()).await?;
    Ok(Json(PagedResponse { items, total }))
}

async fn all(state: &AppState, collection: Collection) -> Result<Json<Vec<Document>>, ApiError> {
    let items = state
        .store
        .find(collection, &Filter::all(), Page::default())
        .await?;
    Ok(Json(items))
}

/// Stamp the author's email onto a posted document
fn authored(body: Value, context: &AuthContext, field: &str) -> Result<Document, ApiError> {
    let mut document = object_body(body)?;
    document.insert(field.to_string(), json!(context.email()));
    Ok(document)
}

#[tracing::instrument(skip(state))]
pub async fn list_gallery(
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<PagedResponse>, ApiError> {
    paged(&state, Collection::Gallery, page).await
}

#[tracing::instrument(skip(state, body))]
pub async fn add_image(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let image = object_body(body)?;
    let result = state.store.insert_one(Collection::Gallery, image).await?;
    Ok(Json(json!(result)))
}

#[tracing::instrument(skip(state))]
pub async fn list_classes(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    all(&state, Collection::Classes).await
}

#[tracing::instrument(skip(state, body))]
pub async fn add_class(
    State(state): State<AppState>,
    context: AuthContext,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let class = authored(body, &context, "trainer_email")?;
    let result = state.store.insert_one(Collection::Classes, class).await?;
    Ok(Json(json!(result)))
}

#[tracing::instrument(skip(state))]
pub async fn list_forums(
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<PagedResponse>, ApiError> {
    paged(&state, Collection::Forums, page).await
}

#[tracing::instrument(skip(state, body))]
pub async fn add_forum_post(
    State(state): State<AppState>,
    context: AuthContext,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let post = authored(body, &context, "author_email")?;
    let result = state.store.insert_one(Collection::Forums, post).await?;
    Ok(Json(json!(result)))
}

#[tracing::instrument(skip(state))]
pub async fn list_testimonials(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    all(&state, Collection::Testimonials).await
}

#[tracing::instrument(skip(state, body))]
pub async fn add_testimonial(
    State(state): State<AppState>,
    context: AuthContext,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let testimonial = authored(body, &context, "email")?;
    let result = state
        .store
        .insert_one(Collection::Testimonials, testimonial)
        .await?;
    Ok(Json(json!(result)))
}

#[tracing::instrument(skip(state))]
pub async fn list_subscribers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    all(&state, Collection::Newsletters).await
}

/// Subscribe the caller's own email to the newsletter
#[tracing::instrument(skip(state, body))]
pub async fn subscribe(
    State(state): State<AppState>,
    context: AuthContext,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let subscription = object_body(body)?;
    let email = email_field(&subscription)?;
    context.ensure_identity(&email)?;

    let existing = state
        .store
        .count(Collection::Newsletters, &Filter::eq("email", email.as_str()))
        .await?;
    if existing > 0 {
        return Ok(Json(json!(MessageResponse::new("already subscribed"))));
    }

    let result = state
        .store
        .insert_one(Collection::Newsletters, subscription)
        .await?;
    Ok(Json(json!(result)))
}
