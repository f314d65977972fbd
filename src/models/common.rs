use serde::{Deserialize, Serialize};

use crate::store::Document;

/// One window of a paginated listing plus the unpaginated total
#[derive(Debug, Serialize, Deserialize)]
pub struct PagedResponse {
    pub items: Vec<Document>,
    pub total: u64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
    /// Always `null`; kept so clients can treat it like an insert result
    pub inserted_id: Option<String>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            inserted_id: None,
        }
    }
}

/// Dashboard figures for administrators
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminStats {
    pub users: u64,
    pub trainers: u64,
    pub classes: u64,
    pub bookings: u64,
    pub payments: u64,
    pub revenue: f64,
}
