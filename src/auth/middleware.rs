use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::auth::{AuthContext, AuthError, AuthService, UserRole};

/// Token verification gate. Rejects with 401 unless the request carries a
/// valid, unexpired bearer token, then attaches the decoded claims.
pub async fn verify_token(
    State(auth_service): State<AuthService>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok());

    let context = auth_service.authenticate(auth_header).map_err(|err| {
        warn!(path = %request.uri().path(), reason = %err, "rejected unauthenticated request");
        err
    })?;

    request.extensions_mut().insert(context);

    Ok(next.run(request).await)
}

/// Admin gate; must run after `verify_token`
pub async fn verify_admin(
    State(auth_service): State<AuthService>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    require_roles(&auth_service, request, next, &[UserRole::Admin]).await
}

/// Trainer gate (admins included); must run after `verify_token`
pub async fn verify_trainer(
    State(auth_service): State<AuthService>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    require_roles(
        &auth_service,
        request,
        next,
        &[UserRole::Trainer, UserRole::Admin],
    )
    .await
}

async fn require_roles(
    auth_service: &AuthService,
    request: Request,
    next: Next,
    allowed: &[UserRole],
) -> Result<Response, AuthError> {
    // Without a context the verification gate did not run.
    let context = request
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or(AuthError::MissingAuthHeader)?;

    auth_service.authorize(&context, allowed).await?;

    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}

/// CORS configuration; the API is consumed by a browser client on another origin
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Security headers middleware
pub fn security_headers_layer() -> tower_http::set_header::SetResponseHeaderLayer<axum::http::HeaderValue> {
    tower_http::set_header::SetResponseHeaderLayer::overriding(
        axum::http::header::HeaderName::from_static("x-content-type-options"),
        axum::http::HeaderValue::from_static("nosniff"),
    )
}
