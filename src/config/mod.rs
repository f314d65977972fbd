// Runtime configuration

pub mod app;
pub mod database;

pub use app::*;
pub use database::*;
