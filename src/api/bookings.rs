use axum::{
    extract::{Path, State},
    response::Json,
};
use serde_json::{json, Value};

use crate::api::errors::{email_field, object_body};
use crate::api::{ApiError, AppState};
use crate::auth::AuthContext;
use crate::models::AdminStats;
use crate::store::{Collection, Document, Filter, Page};

/// Book a class or trainer slot for the caller
#[tracing::instrument(skip(state, body))]
pub async fn create_booking(
    State(state): State<AppState>,
    context: AuthContext,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let booking = object_body(body)?;
    let email = email_field(&booking)?;
    context.ensure_identity(&email)?;

    let result = state.store.insert_one(Collection::Bookings, booking).await?;
    Ok(Json(json!(result)))
}

/// The caller's own bookings
#[tracing::instrument(skip(state))]
pub async fn list_bookings(
    State(state): State<AppState>,
    context: AuthContext,
    Path(email): Path<String>,
) -> Result<Json<Vec<Document>>, ApiError> {
    context.ensure_identity(&email)?;

    let bookings = state
        .store
        .find(
            Collection::Bookings,
            &Filter::eq("email", email.as_str()),
            Page::default(),
        )
        .await?;
    Ok(Json(bookings))
}

/// Cancel a booking; only its owner may do so
#[tracing::instrument(skip(state))]
pub async fn cancel_booking(
    State(state): State<AppState>,
    context: AuthContext,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let booking = state
        .store
        .find_one(Collection::Bookings, &Filter::by_id(&id))
        .await?
        .ok_or(ApiError::NotFound("Booking"))?;
    context.ensure_identity(&email_field(&booking)?)?;

    let result = state
        .store
        .delete_one(Collection::Bookings, &Filter::by_id(&id))
        .await?;
    Ok(Json(json!(result)))
}

/// Record a payment made by the caller. `price` must be a number.
#[tracing::instrument(skip(state, body))]
pub async fn create_payment(
    State(state): State<AppState>,
    context: AuthContext,
    Json(body): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let mut payment = object_body(body)?;
    let email = email_field(&payment)?;
    context.ensure_identity(&email)?;

    if !payment.get("price").map(Value::is_number).unwrap_or(false) {
        return Err(ApiError::BadRequest("price must be a number".to_string()));
    }
    payment.insert("date".to_string(), json!(chrono::Utc::now().to_rfc3339()));

    let result = state.store.insert_one(Collection::Payments, payment).await?;
    tracing::info!(email = %email, "recorded payment");
    Ok(Json(json!(result)))
}

/// Every payment (admin only)
#[tracing::instrument(skip(state))]
pub async fn list_payments(
    State(state): State<AppState>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let payments = state
        .store
        .find(Collection::Payments, &Filter::all(), Page::default())
        .await?;
    Ok(Json(payments))
}

/// The caller's own payment history
#[tracing::instrument(skip(state))]
pub async fn payment_history(
    State(state): State<AppState>,
    context: AuthContext,
    Path(email): Path<String>,
) -> Result<Json<Vec<Document>>, ApiError> {
    context.ensure_identity(&email)?;

    let payments = state
        .store
        .find(
            Collection::Payments,
            &Filter::eq("email", email.as_str()),
            Page::default(),
        )
        .await?;
    Ok(Json(payments))
}

/// Collection counts and total revenue (admin only)
#[tracing::instrument(skip(state))]
pub async fn admin_stats(State(state): State<AppState>) -> Result<Json<AdminStats>, ApiError> {
    let all = Filter::all();
    let store = &state.store;

    Ok(Json(AdminStats {
        users: store.count(Collection::Users, &all).await?,
        trainers: store.count(Collection::Trainers, &all).await?,
        classes: store.count(Collection::Classes, &all).await?,
        bookings: store.count(Collection::Bookings, &all).await?,
        payments: store.count(Collection::Payments, &all).await?,
        revenue: store.sum(Collection::Payments, &all, "price").await?,
    }))
}
