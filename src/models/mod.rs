// Request and response bodies of the resource API

pub mod common;
pub mod user;

pub use common::*;
pub use user::*;
