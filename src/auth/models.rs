use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::auth::AuthError;

/// Directory roles. Anything other than the exact literals `"admin"` and
/// `"trainer"` (including no role at all) is a plain member.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Member,
    Trainer,
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Member => "member",
            UserRole::Trainer => "trainer",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "member" => Some(UserRole::Member),
            "trainer" => Some(UserRole::Trainer),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }

    /// Role of a directory record; missing or unrecognised values are members.
    pub fn from_record(role: Option<&str>) -> Self {
        role.and_then(Self::parse).unwrap_or(UserRole::Member)
    }
}

/// Claim names the token service owns; callers cannot override them.
pub const RESERVED_CLAIMS: [&str; 3] = ["email", "iat", "exp"];

/// JWT token claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    /// Any other fields of the issuance payload
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /jwt`
#[derive(Debug, Clone, Deserialize)]
pub struct IssueTokenRequest {
    pub email: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Directory entry for an identity
#[derive(Debug, Clone, PartialEq)]
pub struct IdentityRecord {
    pub email: String,
    pub role: Option<String>,
}

impl IdentityRecord {
    pub fn role(&self) -> UserRole {
        UserRole::from_record(self.role.as_deref())
    }
}

/// Per-request identity, present only after the token verified.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthContext {
    pub claims: Claims,
}

impl AuthContext {
    pub fn email(&self) -> &str {
        &self.claims.email
    }

    /// Self-lookup routes: the requested identity must be the token's own.
    pub fn ensure_identity(&self, email: &str) -> Result<(), AuthError> {
        if self.claims.email != email {
            return Err(AuthError::IdentityMismatch);
        }
        Ok(())
    }
}
