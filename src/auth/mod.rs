// Authentication and authorization

pub mod directory;
pub mod errors;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod service;

pub use directory::*;
pub use errors::*;
pub use jwt::*;
pub use middleware::*;
pub use models::*;
pub use service::*;
