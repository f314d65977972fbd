use axum::response::Json;
use serde_json::{json, Value};

pub async fn root() -> &'static str {
    "Fresh&Fit is running"
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "freshfit",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}
