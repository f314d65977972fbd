use std::sync::Arc;
use tracing::{debug, warn};

use crate::auth::{
    extract_bearer_token, AuthContext, AuthError, IssueTokenRequest, JwtService, TokenResponse,
    UserDirectory, UserRole,
};

/// Token issuance, verification and the role gate.
///
/// Holds no per-request state; roles are read from the directory on every
/// check and never taken from the token.
#[derive(Clone)]
pub struct AuthService {
    jwt_service: JwtService,
    directory: Arc<dyn UserDirectory>,
}

impl AuthService {
    pub fn new(jwt_service: JwtService, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            jwt_service,
            directory,
        }
    }

    pub fn jwt_service(&self) -> &JwtService {
        &self.jwt_service
    }

    /// Issue a credential for any payload carrying an email
    pub fn issue_token(&self, request: IssueTokenRequest) -> Result<TokenResponse, AuthError> {
        let token = self.jwt_service.issue(&request.email, request.extra)?;
        debug!(email = %request.email, "issued access token");

        Ok(TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: self.jwt_service.expires_in_seconds(),
        })
    }

    /// Turn a raw `Authorization` header value into a request context
    pub fn authenticate(&self, auth_header: Option<&str>) -> Result<AuthContext, AuthError> {
        let auth_header = auth_header.ok_or(AuthError::MissingAuthHeader)?;
        let token = extract_bearer_token(auth_header)?;
        let claims = self.jwt_service.verify(token)?;

        Ok(AuthContext { claims })
    }

    /// Current directory role; identities without a record are members
    pub async fn current_role(&self, email: &str) -> Result<UserRole, AuthError> {
        let record = self.directory.find_by_email(email).await.map_err(|err| {
            warn!(error = %err, "user directory lookup failed");
            AuthError::DirectoryUnavailable(err.to_string())
        })?;

        Ok(record.map(|record| record.role()).unwrap_or(UserRole::Member))
    }

    /// Pass only if the context's current role is one of `allowed`
    pub async fn authorize(
        &self,
        context: &AuthContext,
        allowed: &[UserRole],
    ) -> Result<UserRole, AuthError> {
        let role = self.current_role(context.email()).await?;

        if !allowed.contains(&role) {
            warn!(email = %context.email(), role = role.as_str(), "role check rejected request");
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(role)
    }
}
