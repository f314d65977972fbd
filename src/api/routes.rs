use axum::{
    middleware,
    routing::{delete, get, patch, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::{auth, bookings, content, health, trainers, users};
use crate::auth::{
    cors_layer, security_headers_layer, verify_admin, verify_token, verify_trainer, AuthService,
};
use crate::store::DocumentStore;

/// Shared handles injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub store: Arc<dyn DocumentStore>,
}

impl AppState {
    pub fn new(auth_service: AuthService, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            auth_service,
            store,
        }
    }
}

/// Every route is registered under exactly one access level: public,
/// authenticated, trainer or admin. Gates run outermost first, so token
/// verification always precedes the role check.
pub fn create_routes(state: AppState) -> Router {
    let auth_service = state.auth_service.clone();

    Router::new()
        .merge(public_routes())
        .merge(authenticated_routes(auth_service.clone()))
        .merge(trainer_routes(auth_service.clone()))
        .merge(admin_routes(auth_service))
        .layer(TraceLayer::new_for_http())
        .layer(security_headers_layer())
        .layer(cors_layer())
        .with_state(state)
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/jwt", post(auth::issue_token))
        .route("/trainers", get(trainers::list_trainers))
        .route("/trainers/:id", get(trainers::get_trainer))
        .route("/gallery", get(content::list_gallery))
        .route("/classes", get(content::list_classes))
        .route("/forums", get(content::list_forums))
        .route("/testimonials", get(content::list_testimonials))
}

fn authenticated_routes(auth_service: AuthService) -> Router<AppState> {
    Router::new()
        .route("/users", post(users::create_user))
        .route("/users/admin/:email", get(users::check_admin))
        .route("/users/role/:email", get(users::get_role))
        .route("/trainer-requests", post(trainers::apply))
        .route("/testimonials", post(content::add_testimonial))
        .route("/newsletters", post(content::subscribe))
        .route("/bookings", post(bookings::create_booking))
        .route("/bookings/user/:email", get(bookings::list_bookings))
        .route("/bookings/:id", delete(bookings::cancel_booking))
        .route("/payments", post(bookings::create_payment))
        .route("/payments/:email", get(bookings::payment_history))
        .route_layer(middleware::from_fn_with_state(auth_service, verify_token))
}

fn trainer_routes(auth_service: AuthService) -> Router<AppState> {
    Router::new()
        .route("/classes", post(content::add_class))
        .route("/forums", post(content::add_forum_post))
        .route_layer(middleware::from_fn_with_state(
            auth_service.clone(),
            verify_trainer,
        ))
        .route_layer(middleware::from_fn_with_state(auth_service, verify_token))
}

fn admin_routes(auth_service: AuthService) -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list_users))
        .route("/users/:id", delete(users::delete_user))
        .route("/users/:id/role", patch(users::update_role))
        .route("/trainers", post(trainers::add_trainer))
        .route("/trainers/:id", delete(trainers::remove_trainer))
        .route("/trainer-requests", get(trainers::list_requests))
        .route(
            "/trainer-requests/:id/approve",
            patch(trainers::approve_request),
        )
        .route("/gallery", post(content::add_image))
        .route("/newsletters", get(content::list_subscribers))
        .route("/payments", get(bookings::list_payments))
        .route("/admin-stats", get(bookings::admin_stats))
        .route_layer(middleware::from_fn_with_state(
            auth_service.clone(),
            verify_admin,
        ))
        .route_layer(middleware::from_fn_with_state(auth_service, verify_token))
}
