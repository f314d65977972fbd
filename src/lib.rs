//! Fresh&Fit gym backend: a bearer-token gateway in front of a small
//! document-store REST API.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod store;
