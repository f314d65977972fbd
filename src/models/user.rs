use serde::{Deserialize, Serialize};

use crate::auth::UserRole;

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminCheckResponse {
    pub admin: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoleResponse {
    pub email: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApprovalResponse {
    pub approved: bool,
    pub email: String,
}
