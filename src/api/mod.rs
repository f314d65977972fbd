// API routes and handlers

pub mod auth;
pub mod bookings;
pub mod content;
pub mod errors;
pub mod health;
pub mod routes;
pub mod trainers;
pub mod users;

pub use errors::ApiError;
pub use routes::{create_routes, AppState};
